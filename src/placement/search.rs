use super::balance::{accept, penalty, ClassCounts, ClassState};
use super::existing::ExistingGroups;
use super::ideal::{ideal_for, IdealDistribution};
use super::observer::SearchObserver;
use super::{Placement, ScenarioResult};
use crate::config::{BalanceLimits, Config};
use crate::grouping::{Category, Group};
use crate::roster::Roster;
use std::cmp::Reverse;
use strum::EnumCount;

/// A group queued for placement, with its precomputed category and counters.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub group: Group,
    pub category: Category,
    pub delta: ClassCounts,
}

impl WorkItem {
    pub fn new(roster: &Roster, group: Group, category: Category) -> Self {
        let delta = ClassCounts::of_students(group.members().iter().filter_map(|m| roster.get(m)));
        Self {
            group,
            category,
            delta,
        }
    }
}

/// Flattens category buckets and orders them so the categories farthest from
/// their quota come first: need desc, size desc, gender imbalance desc.
/// The sort is stable, so ties keep bucket order.
pub fn order_work_items(
    roster: &Roster,
    categorized: &[(Category, Vec<Group>)],
    existing: &ExistingGroups,
    ideal: &IdealDistribution,
) -> Vec<WorkItem> {
    let mut items: Vec<WorkItem> = categorized
        .iter()
        .flat_map(|(category, groups)| {
            groups
                .iter()
                .map(move |g| WorkItem::new(roster, g.clone(), *category))
        })
        .collect();

    items.sort_by_key(|item| {
        let need = ideal_for(ideal, item.category).saturating_sub(existing.total(item.category));
        (
            Reverse(need),
            Reverse(item.group.size()),
            Reverse(item.delta.gender_imbalance()),
        )
    });
    items
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub max_results: usize,
    /// `None` disables the budget.
    pub max_nodes: Option<usize>,
    pub exhaustive: bool,
    pub limits: BalanceLimits,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SearchOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            max_results: cfg.search.max_results,
            max_nodes: cfg.search.max_nodes.filter(|&n| n > 0),
            exhaustive: cfg.search.exhaustive,
            limits: cfg.limits,
        }
    }
}

/// Everything the search reads but never mutates.
pub struct SearchProblem<'a> {
    pub classes: &'a [String],
    pub items: &'a [WorkItem],
    pub base: &'a [ClassCounts],
    pub existing: &'a ExistingGroups,
    pub ideal: &'a IdealDistribution,
}

#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// Accepted assignments in discovery order.
    pub results: Vec<ScenarioResult>,
    pub nodes: usize,
    pub budget_exhausted: bool,
}

/// Three-tier class preference for a group of `category`.
///
/// Classes are first ordered by load (total, good, boys + girls), then split
/// into: below the category's ideal quota; alternation candidates whose last
/// placed category is the opposite one; everything else. Each tier keeps the
/// load order.
pub fn preferred_classes(
    category: Category,
    counts: &[ClassCounts],
    existing: &ExistingGroups,
    placed_here: &[[usize; Category::COUNT]],
    last_category: &[Option<Category>],
    ideal: &IdealDistribution,
) -> Vec<usize> {
    let mut baseline: Vec<usize> = (0..counts.len()).collect();
    baseline.sort_by_key(|&c| (counts[c].total, counts[c].good, counts[c].gender_sum()));

    let quota = ideal_for(ideal, category);
    let opposite = category.opposite();

    let mut below_ideal = Vec::new();
    let mut alternation = Vec::new();
    let mut others = Vec::new();

    for c in baseline {
        let current = existing.get(c, category) + placed_here[c][category.index()];
        if current < quota {
            below_ideal.push(c);
        } else if opposite.is_some() && last_category[c] == opposite {
            alternation.push(c);
        } else {
            others.push(c);
        }
    }

    below_ideal.extend(alternation);
    below_ideal.extend(others);
    below_ideal
}

struct Searcher<'p, 'o> {
    problem: &'p SearchProblem<'p>,
    options: &'p SearchOptions,
    observer: &'o mut dyn SearchObserver,
    state: ClassState,
    assigned: Vec<usize>,
    placed_here: Vec<[usize; Category::COUNT]>,
    last_category: Vec<Option<Category>>,
    nodes: usize,
    budget_exhausted: bool,
    results: Vec<ScenarioResult>,
}

impl Searcher<'_, '_> {
    fn snapshot(&self) -> Placement {
        let assignments = self
            .problem
            .items
            .iter()
            .zip(&self.assigned)
            .map(|(item, &c)| (item.group.clone(), self.problem.classes[c].clone()))
            .collect();
        Placement::new(assignments)
    }

    fn dfs(&mut self, idx: usize) {
        self.nodes += 1;
        let opts = self.options;

        if !opts.exhaustive {
            if let Some(budget) = opts.max_nodes {
                if self.nodes > budget {
                    self.budget_exhausted = true;
                    return;
                }
            }
        }

        if self.state.exceeds_capacity(opts.limits.capacity) {
            return;
        }

        let items = self.problem.items;
        if idx == items.len() {
            let counts = self.state.counts();
            if accept(counts, &opts.limits) {
                let score = penalty(counts, &opts.limits);
                let result = ScenarioResult {
                    placement: self.snapshot(),
                    penalty: score,
                    counts: counts.to_vec(),
                };
                self.results.push(result);
                self.observer.on_result(score, self.results.len());
            }
            return;
        }

        let item = &items[idx];
        let (category, delta) = (item.category, item.delta);

        let order = preferred_classes(
            category,
            self.state.counts(),
            self.problem.existing,
            &self.placed_here,
            &self.last_category,
            self.problem.ideal,
        );
        self.observer
            .on_preferred_order(&item.group, category, &order, self.problem.classes);

        for c in order {
            self.state.apply(c, delta);
            self.assigned.push(c);
            self.placed_here[c][category.index()] += 1;
            let previous = self.last_category[c].replace(category);

            if opts.exhaustive || self.state.population_spread() <= opts.limits.prune_population_diff
            {
                self.dfs(idx + 1);
            }

            self.last_category[c] = previous;
            self.placed_here[c][category.index()] -= 1;
            self.assigned.pop();
            self.state.revert(c, delta);

            if self.budget_exhausted || (!opts.exhaustive && self.results.len() >= opts.max_results)
            {
                return;
            }
        }
    }
}

/// Depth-first search over class choices for every work item.
///
/// Returns accepted assignments in discovery order; ranking is left to the
/// caller. An empty result list means no assignment satisfied the limits.
pub fn run_search(
    problem: &SearchProblem<'_>,
    options: &SearchOptions,
    observer: &mut dyn SearchObserver,
) -> SearchOutcome {
    let k = problem.classes.len();
    let mut searcher = Searcher {
        problem,
        options,
        observer,
        state: ClassState::new(problem.base.to_vec()),
        assigned: Vec::with_capacity(problem.items.len()),
        placed_here: vec![[0; Category::COUNT]; k],
        last_category: vec![None; k],
        nodes: 0,
        budget_exhausted: false,
        results: Vec::new(),
    };

    if !problem.items.is_empty() && k > 0 {
        searcher.dfs(0);
    }

    let outcome = SearchOutcome {
        results: searcher.results,
        nodes: searcher.nodes,
        budget_exhausted: searcher.budget_exhausted,
    };
    searcher
        .observer
        .on_complete(outcome.nodes, outcome.results.len(), outcome.budget_exhausted);
    outcome
}
