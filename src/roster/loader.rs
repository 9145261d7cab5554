use super::{Gender, IndividualPlacements, Knowledge, Roster, Student};
use crate::error::{CfResult, ClassForgeError};
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

const NAME_HEADERS: &[&str] = &["name", "ΟΝΟΜΑ"];
const GENDER_HEADERS: &[&str] = &["gender", "ΦΥΛΟ"];
const KNOWLEDGE_HEADERS: &[&str] = &["good_knowledge", "ΚΑΛΗ_ΓΝΩΣΗ_ΕΛΛΗΝΙΚΩΝ"];
const FRIENDS_HEADERS: &[&str] = &["friends", "ΦΙΛΟΙ"];
const BROKEN_HEADERS: &[&str] = &["broken_friendship", "ΣΠΑΣΜΕΝΕΣ_ΦΙΛΙΕΣ"];

struct Layout {
    name: usize,
    gender: usize,
    knowledge: usize,
    friends: usize,
    broken: Option<usize>,
    placements: Vec<(usize, String)>,
}

fn find_header(headers: &csv::StringRecord, aliases: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let h = h.trim();
        aliases.iter().any(|a| a.eq_ignore_ascii_case(h))
    })
}

fn require_header(headers: &csv::StringRecord, aliases: &[&str]) -> CfResult<usize> {
    find_header(headers, aliases).ok_or_else(|| {
        ClassForgeError::Validation(format!(
            "Roster is missing required column '{}'",
            aliases[0]
        ))
    })
}

fn resolve_layout(headers: &csv::StringRecord) -> CfResult<Layout> {
    let name = require_header(headers, NAME_HEADERS)?;
    let gender = require_header(headers, GENDER_HEADERS)?;
    let knowledge = require_header(headers, KNOWLEDGE_HEADERS)?;
    let friends = require_header(headers, FRIENDS_HEADERS)?;
    let broken = find_header(headers, BROKEN_HEADERS);

    let fixed = [Some(name), Some(gender), Some(knowledge), Some(friends), broken];
    let placements = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| !fixed.contains(&Some(*i)))
        .map(|(i, h)| (i, h.trim().to_string()))
        .filter(|(_, h)| !h.is_empty())
        .collect();

    Ok(Layout {
        name,
        gender,
        knowledge,
        friends,
        broken,
        placements,
    })
}

/// Splits a friend cell. Accepts `a;b`, `a, b`, `a|b` and list literals such as `['a', 'b']`.
pub fn parse_friend_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']');
    trimmed
        .split([';', ',', '|'])
        .map(|s| s.trim().trim_matches(|c| c == '\'' || c == '"').trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "0" | "no" | "n" | "nan" => Some(false),
        "true" | "1" | "yes" | "y" => Some(true),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Latin,
    Greek,
}

fn token_script(raw: &str) -> Option<Script> {
    if raw.chars().any(|c| ('\u{0370}'..='\u{03FF}').contains(&c)) {
        Some(Script::Greek)
    } else if raw.chars().any(|c| c.is_ascii_alphabetic()) {
        Some(Script::Latin)
    } else {
        None
    }
}

fn is_blank_placement(raw: &str) -> bool {
    let v = raw.trim();
    v.is_empty() || v.eq_ignore_ascii_case("nan") || v.eq_ignore_ascii_case("null")
}

pub fn load_roster<P: AsRef<Path>>(path: P) -> CfResult<Roster> {
    let path = path.as_ref();
    info!("Loading roster from: {}", path.display());
    let file = File::open(path).map_err(ClassForgeError::Io)?;
    load_roster_from_reader(file)
}

pub fn load_roster_from_reader<R: Read>(reader: R) -> CfResult<Roster> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let layout = resolve_layout(&headers)?;
    debug!(
        "Roster layout: {} placement column(s) {:?}",
        layout.placements.len(),
        layout.placements.iter().map(|(_, h)| h).collect::<Vec<_>>()
    );

    let mut students = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    // Latin N and Greek Nu look alike but mean opposite things
    let mut knowledge_script: Option<(Script, usize)> = None;
    for (row_idx, result) in rdr.records().enumerate() {
        // header is line 1
        let line = row_idx + 2;
        let rec = result?;
        let cell = |i: usize| rec.get(i).unwrap_or("").trim();

        let name = cell(layout.name);
        if name.is_empty() {
            warn!("[Row {}] Skipping row without a name", line);
            continue;
        }
        if !seen.insert(name.to_string()) {
            return Err(ClassForgeError::Validation(format!(
                "[Row {}] Duplicate student name '{}'",
                line, name
            )));
        }

        let gender = Gender::from_str(cell(layout.gender)).map_err(|_| {
            ClassForgeError::Validation(format!(
                "[Row {}] Unknown gender '{}' for '{}'",
                line,
                cell(layout.gender),
                name
            ))
        })?;
        if let Some(script) = token_script(cell(layout.knowledge)) {
            match knowledge_script {
                None => knowledge_script = Some((script, line)),
                Some((first, first_line)) if first != script => {
                    return Err(ClassForgeError::Validation(format!(
                        "[Row {}] Language proficiency '{}' for '{}' is {:?} but row {} is {:?}; \
                         the column mixes Greek and Latin tokens",
                        line,
                        cell(layout.knowledge),
                        name,
                        script,
                        first_line,
                        first
                    )));
                }
                Some(_) => {}
            }
        }
        let knowledge = Knowledge::from_str(cell(layout.knowledge)).map_err(|_| {
            ClassForgeError::Validation(format!(
                "[Row {}] Unknown language proficiency '{}' for '{}'",
                line,
                cell(layout.knowledge),
                name
            ))
        })?;
        let broken_friendship = match layout.broken {
            Some(i) => parse_flag(cell(i)).ok_or_else(|| {
                ClassForgeError::Validation(format!(
                    "[Row {}] Invalid broken-friendship flag '{}' for '{}'",
                    line,
                    cell(i),
                    name
                ))
            })?,
            None => false,
        };

        let mut placements = BTreeMap::new();
        for (i, column) in &layout.placements {
            let v = cell(*i);
            if !is_blank_placement(v) {
                placements.insert(column.clone(), v.to_string());
            }
        }

        students.push(Student {
            name: name.to_string(),
            gender,
            knowledge,
            friends: parse_friend_list(cell(layout.friends)),
            broken_friendship,
            placements,
        });
    }

    let columns = layout.placements.into_iter().map(|(_, h)| h).collect();
    let roster = Roster::with_columns(students, columns)?;
    info!(
        "Loaded {} students, placement columns: {:?}",
        roster.len(),
        roster.columns()
    );
    Ok(roster)
}

/// Reads `name,class` rows of students placed individually by an earlier phase.
pub fn load_individuals<P: AsRef<Path>>(path: P) -> CfResult<IndividualPlacements> {
    let path = path.as_ref();
    info!("Loading individual placements from: {}", path.display());
    let file = File::open(path).map_err(ClassForgeError::Io)?;

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let mut entries = Vec::new();
    let mut skipped_count = 0;
    for result in rdr.records() {
        let rec = result?;
        if rec.len() < 2 {
            skipped_count += 1;
            continue;
        }
        let name = rec[0].trim();
        let class = rec[1].trim();
        if name.is_empty() || is_blank_placement(class) {
            skipped_count += 1;
            continue;
        }
        entries.push((name.to_string(), class.to_string()));
    }

    if skipped_count > 0 {
        warn!("Skipped {} invalid individual placement rows.", skipped_count);
    }
    Ok(entries)
}
