use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use classforge::config::Config;
use classforge::CfResult;
use std::path::Path;
use std::process;
use tracing::{error, info, warn, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file with search, limit and export settings.
    #[arg(global = true, long = "config")]
    config_path: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Place mutual friendship pairs and rank the resulting scenarios.
    Solve(cmd::solve::SolveArgs),
    /// Audit discovered pairs, preserved pairs and category quotas.
    Pairs(cmd::pairs::PairsArgs),
    /// Write a synthetic roster CSV.
    Generate(cmd::generate::GenerateArgs),
}

/// File settings first, then any value given explicitly on the command line.
fn resolve_config(path: Option<&str>, cli_config: &Config, sub_matches: &ArgMatches) -> CfResult<Config> {
    let Some(path) = path else {
        cli_config.validate()?;
        return Ok(cli_config.clone());
    };

    if !Path::new(path).exists() {
        warn!("⚠️  Config file '{}' not found. Using command line values.", path);
        cli_config.validate()?;
        return Ok(cli_config.clone());
    }

    info!("⚖️  Loading settings from: {}", path);
    let mut config = Config::load_from_file(path)?;
    config.merge_from_cli(cli_config, sub_matches);
    config.validate()?;
    Ok(config)
}

fn run(cli: Cli, matches: &ArgMatches) -> CfResult<()> {
    let config_path = cli.config_path.as_deref();
    match cli.command {
        Commands::Solve(args) => {
            let sub = matches.subcommand_matches("solve").unwrap_or(matches);
            let config = resolve_config(config_path, &args.config, sub)?;
            cmd::solve::run(&args, config)
        }
        Commands::Pairs(args) => {
            let sub = matches.subcommand_matches("pairs").unwrap_or(matches);
            let config = resolve_config(config_path, &args.config, sub)?;
            cmd::pairs::run(&args, config)
        }
        Commands::Generate(args) => cmd::generate::run(&args),
    }
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    info!("🚀 Initializing ClassForge...");

    if let Err(e) = run(cli, &matches) {
        error!("❌ {}", e);
        process::exit(1);
    }
}
