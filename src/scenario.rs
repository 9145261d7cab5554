use crate::error::CfResult;
use crate::placement::{ClassCounts, ScenarioResult, Solution, Spreads};
use crate::roster::Roster;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// A materialized scenario column and its summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub column: String,
    pub penalty: usize,
    pub assigned: usize,
    pub unassigned: usize,
}

/// Writes each ranked result onto the roster as a new placement column
/// `{prefix}{rank}`: a copy of `source_column` with every placed group's
/// members set to the group's class.
pub fn materialize(
    roster: &mut Roster,
    source_column: &str,
    results: &[ScenarioResult],
    prefix: &str,
) -> Vec<ScenarioSummary> {
    let names: Vec<String> = roster.students().iter().map(|s| s.name.clone()).collect();
    let mut summaries = Vec::with_capacity(results.len());

    for (rank, result) in results.iter().enumerate() {
        let column = format!("{}{}", prefix, rank + 1);
        roster.add_column(&column);

        for name in &names {
            let prior = roster.placement(name, source_column).map(str::to_string);
            roster.set_placement(name, &column, prior.as_deref());
        }
        for (group, class) in result.placement.assignments() {
            for member in group.members() {
                roster.set_placement(member, &column, Some(class));
            }
        }

        let assigned = roster.assigned(&column).count();
        let summary = ScenarioSummary {
            column,
            penalty: result.penalty,
            assigned,
            unassigned: roster.len() - assigned,
        };
        info!(
            "Scenario {}: penalty={}, assigned={}, unassigned={}",
            summary.column, summary.penalty, summary.assigned, summary.unassigned
        );
        summaries.push(summary);
    }

    summaries
}

/// Writes the roster, including every placement column, as CSV.
pub fn write_roster_csv<W: Write>(roster: &Roster, writer: W) -> CfResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec![
        "name".to_string(),
        "gender".to_string(),
        "good_knowledge".to_string(),
        "friends".to_string(),
        "broken_friendship".to_string(),
    ];
    header.extend(roster.columns().iter().cloned());
    wtr.write_record(&header)?;

    for s in roster.students() {
        let mut row = vec![
            s.name.clone(),
            s.gender.to_string(),
            s.knowledge.to_string(),
            s.friends.join(";"),
            s.broken_friendship.to_string(),
        ];
        row.extend(
            roster
                .columns()
                .iter()
                .map(|c| s.placement(c).unwrap_or("").to_string()),
        );
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_roster_csv_file<P: AsRef<Path>>(roster: &Roster, path: P) -> CfResult<()> {
    let path = path.as_ref();
    info!("Writing roster with scenarios to: {}", path.display());
    let file = File::create(path)?;
    write_roster_csv(roster, BufWriter::new(file))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementExport {
    pub members: Vec<String>,
    pub class: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassCountsExport {
    pub class: String,
    #[serde(flatten)]
    pub counts: ClassCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioExport {
    pub column: String,
    pub penalty: usize,
    pub spreads: Spreads,
    pub placements: Vec<PlacementExport>,
    pub counts: Vec<ClassCountsExport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionExport {
    pub column: String,
    pub num_classes: usize,
    pub classes: Vec<String>,
    pub nodes: usize,
    pub budget_exhausted: bool,
    pub scenarios: Vec<ScenarioExport>,
}

impl SolutionExport {
    pub fn from_solution(solution: &Solution, prefix: &str) -> Self {
        let classes = &solution.plan.classes;
        let scenarios = solution
            .results
            .iter()
            .enumerate()
            .map(|(rank, r)| ScenarioExport {
                column: format!("{}{}", prefix, rank + 1),
                penalty: r.penalty,
                spreads: Spreads::of(&r.counts),
                placements: r
                    .placement
                    .assignments()
                    .iter()
                    .map(|(g, c)| PlacementExport {
                        members: g.members().to_vec(),
                        class: c.clone(),
                    })
                    .collect(),
                counts: classes
                    .iter()
                    .zip(&r.counts)
                    .map(|(class, counts)| ClassCountsExport {
                        class: class.clone(),
                        counts: *counts,
                    })
                    .collect(),
            })
            .collect();

        Self {
            column: solution.plan.column.clone(),
            num_classes: classes.len(),
            classes: classes.clone(),
            nodes: solution.nodes,
            budget_exhausted: solution.budget_exhausted,
            scenarios,
        }
    }
}

pub fn write_json<P: AsRef<Path>>(exports: &[SolutionExport], path: P) -> CfResult<()> {
    let path = path.as_ref();
    info!("Writing scenario report to: {}", path.display());
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), exports)?;
    Ok(())
}
