use super::existing::ExistingGroups;
use crate::grouping::{Category, Group};
use std::collections::BTreeMap;

/// Per-class target count of groups for each category.
pub type IdealDistribution = BTreeMap<Category, usize>;

/// Quota assumed for a category with no computed ideal.
pub const DEFAULT_IDEAL: usize = 1;

/// Existing plus newly discovered groups, for every category that has new groups.
pub fn total_groups_per_category(
    existing: &ExistingGroups,
    categorized: &[(Category, Vec<Group>)],
) -> BTreeMap<Category, usize> {
    categorized
        .iter()
        .map(|(category, groups)| (*category, existing.total(*category) + groups.len()))
        .collect()
}

/// `ceil(total / num_classes)` per category.
pub fn calculate_ideal_distribution(
    totals: &BTreeMap<Category, usize>,
    num_classes: usize,
) -> IdealDistribution {
    let k = num_classes.max(1);
    totals
        .iter()
        .map(|(category, &total)| (*category, total.div_ceil(k)))
        .collect()
}

pub fn ideal_for(ideal: &IdealDistribution, category: Category) -> usize {
    ideal.get(&category).copied().unwrap_or(DEFAULT_IDEAL)
}
