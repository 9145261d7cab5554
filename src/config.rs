use crate::error::{CfResult, ClassForgeError};
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Hard ceiling on students per class.
pub const DEFAULT_CLASS_CAPACITY: usize = 25;

/// Default number of ranked scenarios kept.
pub const DEFAULT_MAX_RESULTS: usize = 5;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub search: SearchParams,
    #[command(flatten)]
    pub limits: BalanceLimits,
    #[command(flatten)]
    pub export: ExportParams,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Number of classes. Derived from the roster size when omitted.
    #[arg(long)]
    pub num_classes: Option<usize>,
    #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
    pub max_results: usize,
    /// Node budget for the bounded search. Ignored in exhaustive mode.
    #[arg(long)]
    pub max_nodes: Option<usize>,
    #[arg(long, default_value_t = false)]
    pub exhaustive: bool,
    #[arg(long, default_value = "A")]
    pub class_prefix: String,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            num_classes: None,
            max_results: DEFAULT_MAX_RESULTS,
            max_nodes: None,
            exhaustive: false,
            class_prefix: "A".to_string(),
        }
    }
}

#[derive(Args, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceLimits {
    // === HARD CONSTRAINTS ===
    #[arg(long, default_value_t = DEFAULT_CLASS_CAPACITY)]
    pub capacity: usize,
    #[arg(long, default_value_t = 2)]
    pub max_population_diff: usize,
    #[arg(long, default_value_t = 4)]
    pub max_good_diff: usize,
    #[arg(long, default_value_t = 3)]
    pub max_gender_diff: usize,

    // Anytime pruning while descending (non-exhaustive only)
    #[arg(long, default_value_t = 2)]
    pub prune_population_diff: usize,

    // === PENALTY TOLERANCES ===
    #[arg(long, default_value_t = 1)]
    pub tolerance_population: usize,
    #[arg(long, default_value_t = 2)]
    pub tolerance_good: usize,
    #[arg(long, default_value_t = 1)]
    pub tolerance_gender: usize,
}

impl Default for BalanceLimits {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CLASS_CAPACITY,
            max_population_diff: 2,
            max_good_diff: 4,
            max_gender_diff: 3,
            prune_population_diff: 2,
            tolerance_population: 1,
            tolerance_good: 2,
            tolerance_gender: 1,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportParams {
    #[arg(long, default_value = "STEP4_SCENARIO_")]
    pub scenario_prefix: String,
}

impl Default for ExportParams {
    fn default() -> Self {
        Self {
            scenario_prefix: "STEP4_SCENARIO_".to_string(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> CfResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ClassForgeError::Config(format!("Failed to read config '{}': {}", path.display(), e))
        })?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CfResult<()> {
        if self.search.num_classes == Some(0) {
            return Err(ClassForgeError::Config(
                "num_classes must be at least 1".to_string(),
            ));
        }
        if self.search.max_results == 0 {
            return Err(ClassForgeError::Config(
                "max_results must be at least 1".to_string(),
            ));
        }
        if self.limits.capacity == 0 {
            return Err(ClassForgeError::Config(
                "capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Overlays values that were given explicitly on the command line.
    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($section:ident, $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$section.$field = cli.$section.$field.clone();
                }
            };
        }

        update_if_present!(search, num_classes);
        update_if_present!(search, max_results);
        update_if_present!(search, max_nodes);
        update_if_present!(search, exhaustive);
        update_if_present!(search, class_prefix);

        update_if_present!(limits, capacity);
        update_if_present!(limits, max_population_diff);
        update_if_present!(limits, max_good_diff);
        update_if_present!(limits, max_gender_diff);
        update_if_present!(limits, prune_population_diff);
        update_if_present!(limits, tolerance_population);
        update_if_present!(limits, tolerance_good);
        update_if_present!(limits, tolerance_gender);

        update_if_present!(export, scenario_prefix);
    }
}

/// `max(2, ceil(students / capacity))` unless overridden.
pub fn auto_num_classes(student_count: usize, capacity: usize, requested: Option<usize>) -> usize {
    requested.unwrap_or_else(|| student_count.div_ceil(capacity.max(1)).max(2))
}

/// Class identifiers `"{prefix}1" ..= "{prefix}{k}"`.
pub fn class_names(prefix: &str, num_classes: usize) -> Vec<String> {
    (1..=num_classes).map(|i| format!("{}{}", prefix, i)).collect()
}
