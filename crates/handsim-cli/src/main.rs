use std::path::PathBuf;

use clap::Parser;

use handsim_cli::config::SimulatorConfig;
use handsim_cli::logging::init_logging;
use handsim_cli::runner::SimulationRunner;
use handsim_core::AppInfo;

/// Opening-hand probability calculator for card-game decks.
#[derive(Debug, Parser)]
#[command(
    name = "handsim",
    author,
    version,
    about = "Exact draw odds and seeded sample hands for a deck list"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "handsim.yaml")]
    config: PathBuf,

    /// Override the number of cards in the opening hand.
    #[arg(long, value_name = "CARDS")]
    hand_size: Option<u32>,

    /// Override the RNG seed for sampling.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the Monte-Carlo hands per query (0 disables the cross-check).
    #[arg(long, value_name = "HANDS")]
    trials: Option<u32>,

    /// Emit the report as JSON instead of markdown.
    #[arg(long)]
    json: bool,

    /// Write the report to a file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Exit after validating the configuration and loading the deck.
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = SimulatorConfig::from_path(&cli.config)?;

    if let Some(hand_size) = cli.hand_size {
        config.hand_size = hand_size;
    }

    if let Some(seed) = cli.seed {
        config.simulation.seed = Some(seed);
    }

    if let Some(trials) = cli.trials {
        config.simulation.trials = trials;
    }

    config.validate()?;

    let run_id = config.run_id.clone();
    let logging_guard = init_logging(&config.logging, &run_id)?;
    if let Some(path) = logging_guard.as_ref().and_then(|guard| guard.log_path.as_ref()) {
        eprintln!("Structured log: {}", path.display());
    }
    let runner = SimulationRunner::new(config)?;

    if cli.validate_only {
        let deck = runner.deck();
        let categories = deck.categories().len();
        eprintln!(
            "{} {}: configuration '{run_id}' is valid: {} cards in {categories} categor{}",
            AppInfo::name(),
            AppInfo::version(),
            deck.total_size()?,
            if categories == 1 { "y" } else { "ies" }
        );
        return Ok(());
    }

    let report = runner.run()?;
    match cli.output.as_ref() {
        Some(path) => {
            report.write(path, cli.json)?;
            eprintln!("Report for '{run_id}' written to {}", path.display());
        }
        None if cli.json => println!("{}", report.to_json()?),
        None => print!("{}", report.render_text()),
    }

    Ok(())
}
