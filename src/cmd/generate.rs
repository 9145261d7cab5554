use clap::Args;
use classforge::roster::synthetic::{generate_roster, SyntheticOptions};
use classforge::scenario::write_roster_csv_file;
use classforge::CfResult;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(short = 'n', long, default_value_t = 50)]
    pub students: usize,

    #[arg(long, default_value_t = 2)]
    pub num_classes: usize,

    #[arg(short = 'c', long, default_value = "STEP3_SCENARIO_1")]
    pub column: String,

    #[arg(long, default_value_t = 0.6)]
    pub placed_ratio: f32,

    #[arg(long, default_value_t = 0.5)]
    pub mutual_ratio: f32,

    #[arg(short = 'S', long)]
    pub seed: Option<u64>,

    #[arg(short, long)]
    pub out: PathBuf,
}

pub fn run(args: &GenerateArgs) -> CfResult<()> {
    let mut rng = match args.seed {
        Some(s) => fastrand::Rng::with_seed(s),
        None => fastrand::Rng::new(),
    };

    let opts = SyntheticOptions {
        students: args.students,
        num_classes: args.num_classes,
        column: args.column.clone(),
        placed_ratio: args.placed_ratio.clamp(0.0, 1.0),
        mutual_ratio: args.mutual_ratio.clamp(0.0, 1.0),
        ..SyntheticOptions::default()
    };

    let roster = generate_roster(&opts, &mut rng)?;
    info!(
        "🎲 Generated {} students ({} placed in '{}')",
        roster.len(),
        roster.assigned(&opts.column).count(),
        opts.column
    );
    write_roster_csv_file(&roster, &args.out)
}
