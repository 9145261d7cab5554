pub mod balance;
pub mod existing;
pub mod ideal;
pub mod observer;
pub mod search;

pub use self::balance::{accept, penalty, ClassCounts, ClassState, Spreads};
pub use self::existing::{
    count_groups_by_category_per_class, detect_preserved_pairs, unknown_class_placements,
    ExistingGroups, PreservedPair,
};
pub use self::ideal::{calculate_ideal_distribution, total_groups_per_category, IdealDistribution};
pub use self::observer::{NoopObserver, SearchObserver, TracingObserver};
pub use self::search::{
    order_work_items, preferred_classes, run_search, SearchOptions, SearchOutcome, SearchProblem,
    WorkItem,
};

use crate::config::{auto_num_classes, class_names, Config};
use crate::error::{CfResult, ClassForgeError};
use crate::grouping::{categorize_groups, create_fully_mutual_groups, Group};
use crate::roster::Roster;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// Group -> class assignments in search order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    assignments: Vec<(Group, String)>,
}

impl Placement {
    pub fn new(assignments: Vec<(Group, String)>) -> Self {
        Self { assignments }
    }

    pub fn assignments(&self) -> &[(Group, String)] {
        &self.assignments
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn class_of_group(&self, group: &Group) -> Option<&str> {
        self.assignments
            .iter()
            .find(|(g, _)| g == group)
            .map(|(_, c)| c.as_str())
    }

    /// Class a student receives through a placed group, if any.
    pub fn class_of_student(&self, name: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|(g, _)| g.contains(name))
            .map(|(_, c)| c.as_str())
    }
}

/// An accepted assignment with its penalty and final per-class counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioResult {
    pub placement: Placement,
    pub penalty: usize,
    pub counts: Vec<ClassCounts>,
}

/// Stable sort by ascending penalty, keeping at most `max_results`.
pub fn rank_results(mut results: Vec<ScenarioResult>, max_results: usize) -> Vec<ScenarioResult> {
    results.sort_by_key(|r| r.penalty);
    results.truncate(max_results);
    results
}

/// Inputs of the search derived from the roster before any branching.
#[derive(Debug, Clone)]
pub struct SearchPlan {
    pub column: String,
    pub classes: Vec<String>,
    pub groups: Vec<Group>,
    pub preserved_pairs: Vec<PreservedPair>,
    pub existing: ExistingGroups,
    pub ideal: IdealDistribution,
    pub items: Vec<WorkItem>,
    pub base: Vec<ClassCounts>,
    /// Prior placements in classes outside `classes`; these students are not
    /// part of `base` or `existing`.
    pub unknown_classes: BTreeMap<String, usize>,
}

/// Output of one solve: the plan plus ranked results.
#[derive(Debug, Clone)]
pub struct Solution {
    pub plan: SearchPlan,
    pub results: Vec<ScenarioResult>,
    pub nodes: usize,
    pub budget_exhausted: bool,
}

impl Solution {
    pub fn best(&self) -> Option<&ScenarioResult> {
        self.results.first()
    }
}

/// Class ids the search places into for this roster and configuration.
pub fn plan_classes(roster: &Roster, config: &Config) -> Vec<String> {
    let num_classes = auto_num_classes(
        roster.len(),
        config.limits.capacity,
        config.search.num_classes,
    );
    class_names(&config.search.class_prefix, num_classes)
}

fn describe_unknown(unknown: &BTreeMap<String, usize>) -> String {
    unknown
        .iter()
        .map(|(class, n)| format!("'{}' ({})", class, n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Discovers pairs, reconstructs prior-phase groups and computes quotas.
pub fn build_plan(
    roster: &Roster,
    column: &str,
    config: &Config,
    individuals: Option<&[(String, String)]>,
) -> SearchPlan {
    let classes = plan_classes(roster, config);

    let unknown_classes = unknown_class_placements(roster, column, &classes);
    if !unknown_classes.is_empty() {
        warn!(
            "[{}] Students placed outside {:?} are ignored: {}",
            column,
            classes,
            describe_unknown(&unknown_classes)
        );
    }

    let base: Vec<ClassCounts> = classes
        .iter()
        .map(|c| ClassCounts::of_students(roster.in_class(column, c)))
        .collect();

    let groups = create_fully_mutual_groups(roster, column);
    let categorized = categorize_groups(roster, &groups);

    let preserved_pairs = detect_preserved_pairs(roster, column, &classes);
    let existing =
        count_groups_by_category_per_class(roster, column, &classes, individuals, &preserved_pairs);

    let totals = total_groups_per_category(&existing, &categorized);
    let ideal = calculate_ideal_distribution(&totals, classes.len());
    let items = order_work_items(roster, &categorized, &existing, &ideal);

    SearchPlan {
        column: column.to_string(),
        classes,
        groups,
        preserved_pairs,
        existing,
        ideal,
        items,
        base,
        unknown_classes,
    }
}

/// Places the mutual pairs of `column` and returns up to `max_results`
/// ranked scenarios. No pairs, or no acceptable assignment, yields an empty
/// result list.
pub fn solve(
    roster: &Roster,
    column: &str,
    config: &Config,
    individuals: Option<&[(String, String)]>,
    observer: &mut dyn SearchObserver,
) -> Solution {
    let plan = build_plan(roster, column, config, individuals);
    observer.on_plan(column, &plan.ideal, &plan.existing);

    let options = SearchOptions::from(config);
    let outcome = if plan.items.is_empty() {
        SearchOutcome::default()
    } else {
        let problem = SearchProblem {
            classes: &plan.classes,
            items: &plan.items,
            base: &plan.base,
            existing: &plan.existing,
            ideal: &plan.ideal,
        };
        run_search(&problem, &options, observer)
    };

    Solution {
        results: rank_results(outcome.results, options.max_results),
        nodes: outcome.nodes,
        budget_exhausted: outcome.budget_exhausted,
        plan,
    }
}

/// Solves independent placement columns in parallel, results in column order.
///
/// Fails when a column holds prior placements in classes the search would
/// never place into, e.g. a class prefix that does not match the roster.
pub fn solve_columns(
    roster: &Roster,
    columns: &[String],
    config: &Config,
    individuals: Option<&[(String, String)]>,
) -> CfResult<Vec<Solution>> {
    if let Some(missing) = columns.iter().find(|c| !roster.has_column(c)) {
        return Err(ClassForgeError::Config(format!(
            "Placement column '{}' not found in roster (available: {:?})",
            missing,
            roster.columns()
        )));
    }

    let classes = plan_classes(roster, config);
    for column in columns {
        let unknown = unknown_class_placements(roster, column, &classes);
        if !unknown.is_empty() {
            return Err(ClassForgeError::Config(format!(
                "Column '{}' has students in classes outside {:?}: {}. \
                 Set --class-prefix / --num-classes to match the roster",
                column,
                classes,
                describe_unknown(&unknown)
            )));
        }
    }

    Ok(columns
        .par_iter()
        .map(|column| {
            let mut observer = TracingObserver::default();
            solve(roster, column, config, individuals, &mut observer)
        })
        .collect())
}
