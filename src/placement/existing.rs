use crate::grouping::{get_group_characteristics, is_fully_mutual, Category};
use crate::roster::Roster;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use strum::{EnumCount, IntoEnumIterator};

/// Groups of each category already sitting in each class, inherited from
/// earlier placement phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingGroups {
    classes: Vec<String>,
    counts: Vec<[usize; Category::COUNT]>,
}

impl ExistingGroups {
    pub fn empty(classes: &[String]) -> Self {
        Self {
            classes: classes.to_vec(),
            counts: vec![[0; Category::COUNT]; classes.len()],
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    #[inline(always)]
    pub fn get(&self, class: usize, category: Category) -> usize {
        self.counts[class][category.index()]
    }

    pub fn for_class(&self, class: &str, category: Category) -> usize {
        self.class_index(class)
            .map(|i| self.get(i, category))
            .unwrap_or(0)
    }

    /// Count of a category summed across every class.
    pub fn total(&self, category: Category) -> usize {
        self.counts.iter().map(|c| c[category.index()]).sum()
    }

    /// Non-zero counts per class, for reports.
    pub fn breakdown(&self) -> Vec<(String, BTreeMap<Category, usize>)> {
        self.classes
            .iter()
            .zip(&self.counts)
            .map(|(name, row)| {
                let map = row
                    .iter()
                    .enumerate()
                    .filter(|&(_, &n)| n > 0)
                    .filter_map(|(i, &n)| category_at(i).map(|c| (c, n)))
                    .collect();
                (name.clone(), map)
            })
            .collect()
    }

    fn class_index(&self, class: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == class)
    }

    fn bump(&mut self, class: &str, category: Category) -> bool {
        match self.class_index(class) {
            Some(i) => {
                self.counts[i][category.index()] += 1;
                true
            }
            None => false,
        }
    }
}

fn category_at(i: usize) -> Option<Category> {
    Category::iter().nth(i)
}

/// Placed students whose class in `column` is not one of `classes`, counted
/// per class id.
pub fn unknown_class_placements(
    roster: &Roster,
    column: &str,
    classes: &[String],
) -> BTreeMap<String, usize> {
    let mut unknown = BTreeMap::new();
    for s in roster.assigned(column) {
        if let Some(class) = s.placement(column) {
            if !classes.iter().any(|c| c == class) {
                *unknown.entry(class.to_string()).or_insert(0) += 1;
            }
        }
    }
    unknown
}

/// A preserved pair: two students already co-located in a class who are
/// fully mutual friends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreservedPair {
    pub first: String,
    pub second: String,
    pub class: String,
}

/// Every fully mutual 2-combination of students assigned to the same class,
/// classes in order and students in roster order within a class.
pub fn detect_preserved_pairs(
    roster: &Roster,
    column: &str,
    classes: &[String],
) -> Vec<PreservedPair> {
    let mut pairs = Vec::new();
    for class in classes {
        let members: Vec<&str> = roster
            .in_class(column, class)
            .map(|s| s.name.as_str())
            .collect();
        for (i, &a) in members.iter().enumerate() {
            for &b in &members[i + 1..] {
                if is_fully_mutual(roster, &[a, b]) {
                    pairs.push(PreservedPair {
                        first: a.to_string(),
                        second: b.to_string(),
                        class: class.clone(),
                    });
                }
            }
        }
    }
    pairs
}

/// Reconstructs how many groups of each category already sit in each class.
///
/// Priority: recorded individual placements count as singletons; preserved
/// pairs count once as a pair; every other assigned student counts as a
/// singleton. A student is never counted twice.
pub fn count_groups_by_category_per_class(
    roster: &Roster,
    column: &str,
    classes: &[String],
    individuals: Option<&[(String, String)]>,
    detected_pairs: &[PreservedPair],
) -> ExistingGroups {
    let mut existing = ExistingGroups::empty(classes);
    let mut processed: HashSet<&str> = HashSet::new();

    for (name, class) in individuals.unwrap_or(&[]) {
        if processed.contains(name.as_str()) {
            continue;
        }
        let Some(student) = roster.get(name) else {
            continue;
        };
        let category = Category::of_students([student]);
        if existing.bump(class, category) {
            processed.insert(student.name.as_str());
        }
    }

    for pair in detected_pairs {
        let (a, b) = (pair.first.as_str(), pair.second.as_str());
        if processed.contains(a) || processed.contains(b) {
            continue;
        }
        let (Some(sa), Some(sb)) = (roster.get(a), roster.get(b)) else {
            continue;
        };
        match (sa.placement(column), sb.placement(column)) {
            (Some(ca), Some(cb)) if ca == cb => {
                let category = get_group_characteristics(roster, &[a, b]);
                if existing.bump(ca, category) {
                    processed.insert(sa.name.as_str());
                    processed.insert(sb.name.as_str());
                }
            }
            _ => {}
        }
    }

    for class in classes {
        for s in roster.in_class(column, class) {
            if !processed.contains(s.name.as_str()) {
                existing.bump(class, Category::of_students([s]));
            }
        }
    }

    existing
}
