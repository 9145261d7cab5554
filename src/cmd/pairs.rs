use crate::reports;
use clap::Args;
use classforge::config::Config;
use classforge::error::ClassForgeError;
use classforge::placement::build_plan;
use classforge::roster::{load_individuals, load_roster};
use classforge::CfResult;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct PairsArgs {
    #[command(flatten)]
    pub config: Config,

    #[arg(short, long)]
    pub roster: PathBuf,

    #[arg(short = 'c', long)]
    pub column: String,

    #[arg(short, long)]
    pub individuals: Option<PathBuf>,
}

pub fn run(args: &PairsArgs, config: Config) -> CfResult<()> {
    let roster = load_roster(&args.roster)?;
    if !roster.has_column(&args.column) {
        return Err(ClassForgeError::Config(format!(
            "Placement column '{}' not found in roster (available: {:?})",
            args.column,
            roster.columns()
        )));
    }
    let individuals = args.individuals.as_ref().map(load_individuals).transpose()?;

    let plan = build_plan(&roster, &args.column, &config, individuals.as_deref());

    println!("\n🔎 === PAIR AUDIT: {} === 🔎", plan.column);
    reports::print_pairs_table(&plan);
    reports::print_preserved_pairs(&plan);
    reports::print_existing_table(&plan);
    reports::print_ideal_table(&plan);
    Ok(())
}
