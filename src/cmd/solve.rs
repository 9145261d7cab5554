use crate::reports;
use clap::Args;
use classforge::config::Config;
use classforge::placement::solve_columns;
use classforge::roster::{load_individuals, load_roster};
use classforge::scenario::{materialize, write_json, write_roster_csv_file, SolutionExport};
use classforge::CfResult;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct SolveArgs {
    #[command(flatten)]
    pub config: Config,

    /// Roster CSV.
    #[arg(short, long)]
    pub roster: PathBuf,

    /// Placement column(s) left by the earlier phases. Several columns are solved in parallel.
    #[arg(short = 'c', long = "column", required = true, num_args = 1..)]
    pub columns: Vec<String>,

    /// CSV of `name,class` rows placed individually by an earlier phase.
    #[arg(short, long)]
    pub individuals: Option<PathBuf>,

    /// Write the roster plus scenario columns here.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Write the ranked scenarios as JSON here.
    #[arg(long)]
    pub json: Option<PathBuf>,
}

pub fn run(args: &SolveArgs, config: Config) -> CfResult<()> {
    let mut roster = load_roster(&args.roster)?;
    let individuals = args.individuals.as_ref().map(load_individuals).transpose()?;

    info!(
        "🔍 Placing mutual friendship pairs for {} column(s)",
        args.columns.len()
    );
    let solutions = solve_columns(&roster, &args.columns, &config, individuals.as_deref())?;

    let single = solutions.len() == 1;
    let mut exports = Vec::with_capacity(solutions.len());

    for solution in &solutions {
        let column = &solution.plan.column;
        reports::print_plan_summary(solution);

        if solution.results.is_empty() {
            warn!("❌ No valid placement scenarios found for '{}'.", column);
        } else {
            info!(
                "✅ Found {} scenario(s) for '{}'",
                solution.results.len(),
                column
            );
            reports::print_scenario_table(solution);
            if let Some(best) = solution.best() {
                reports::print_class_counts(&solution.plan.classes, &best.counts);
            }
        }

        let prefix = if single {
            config.export.scenario_prefix.clone()
        } else {
            format!("{}{}_", config.export.scenario_prefix, column)
        };

        if args.out.is_some() {
            let summaries = materialize(&mut roster, column, &solution.results, &prefix);
            reports::print_materialized(&summaries);
        }
        exports.push(SolutionExport::from_solution(solution, &prefix));
    }

    if let Some(path) = &args.out {
        write_roster_csv_file(&roster, path)?;
    }
    if let Some(path) = &args.json {
        write_json(&exports, path)?;
    }
    Ok(())
}
