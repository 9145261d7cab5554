use crate::config::BalanceLimits;
use crate::roster::{Gender, Knowledge, Student};
use serde::{Deserialize, Serialize};
use std::ops::{AddAssign, SubAssign};

/// Running counters of one class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCounts {
    pub total: usize,
    pub good: usize,
    pub boys: usize,
    pub girls: usize,
}

impl ClassCounts {
    pub fn of_student(s: &Student) -> Self {
        Self {
            total: 1,
            good: usize::from(s.knowledge == Knowledge::Good),
            boys: usize::from(s.gender == Gender::Boy),
            girls: usize::from(s.gender == Gender::Girl),
        }
    }

    pub fn of_students<'a, I>(students: I) -> Self
    where
        I: IntoIterator<Item = &'a Student>,
    {
        let mut c = Self::default();
        for s in students {
            c += Self::of_student(s);
        }
        c
    }

    #[inline(always)]
    pub fn gender_sum(&self) -> usize {
        self.boys + self.girls
    }

    #[inline(always)]
    pub fn gender_imbalance(&self) -> usize {
        self.boys.abs_diff(self.girls)
    }
}

impl AddAssign for ClassCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.total += rhs.total;
        self.good += rhs.good;
        self.boys += rhs.boys;
        self.girls += rhs.girls;
    }
}

impl SubAssign for ClassCounts {
    fn sub_assign(&mut self, rhs: Self) {
        self.total -= rhs.total;
        self.good -= rhs.good;
        self.boys -= rhs.boys;
        self.girls -= rhs.girls;
    }
}

/// max - min over one metric; 0 for no classes.
fn spread<F: Fn(&ClassCounts) -> usize>(counts: &[ClassCounts], metric: F) -> usize {
    let mut it = counts.iter().map(metric);
    let Some(first) = it.next() else {
        return 0;
    };
    let (lo, hi) = it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    hi - lo
}

/// Population, good-language and per-gender spreads across classes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spreads {
    pub population: usize,
    pub good: usize,
    pub boys: usize,
    pub girls: usize,
}

impl Spreads {
    pub fn of(counts: &[ClassCounts]) -> Self {
        Self {
            population: spread(counts, |c| c.total),
            good: spread(counts, |c| c.good),
            boys: spread(counts, |c| c.boys),
            girls: spread(counts, |c| c.girls),
        }
    }
}

/// Hard acceptance test of a completed assignment.
pub fn accept(counts: &[ClassCounts], limits: &BalanceLimits) -> bool {
    if counts.iter().any(|c| c.total > limits.capacity) {
        return false;
    }
    let s = Spreads::of(counts);
    s.population <= limits.max_population_diff
        && s.good <= limits.max_good_diff
        && s.boys <= limits.max_gender_diff
        && s.girls <= limits.max_gender_diff
}

/// Soft imbalance score; lower is better.
pub fn penalty(counts: &[ClassCounts], limits: &BalanceLimits) -> usize {
    let s = Spreads::of(counts);
    s.population.saturating_sub(limits.tolerance_population)
        + s.good.saturating_sub(limits.tolerance_good)
        + s.boys.saturating_sub(limits.tolerance_gender)
        + s.girls.saturating_sub(limits.tolerance_gender)
}

/// Per-class counters mutated with strict apply/revert pairing during search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassState {
    counts: Vec<ClassCounts>,
}

impl ClassState {
    pub fn new(counts: Vec<ClassCounts>) -> Self {
        Self { counts }
    }

    pub fn counts(&self) -> &[ClassCounts] {
        &self.counts
    }

    #[inline(always)]
    pub fn get(&self, class: usize) -> ClassCounts {
        self.counts[class]
    }

    #[inline(always)]
    pub fn apply(&mut self, class: usize, delta: ClassCounts) {
        self.counts[class] += delta;
    }

    #[inline(always)]
    pub fn revert(&mut self, class: usize, delta: ClassCounts) {
        self.counts[class] -= delta;
    }

    pub fn exceeds_capacity(&self, capacity: usize) -> bool {
        self.counts.iter().any(|c| c.total > capacity)
    }

    pub fn population_spread(&self) -> usize {
        spread(&self.counts, |c| c.total)
    }

    pub fn into_counts(self) -> Vec<ClassCounts> {
        self.counts
    }
}
