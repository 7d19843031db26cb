use std::path::PathBuf;

use anyhow::Result;
use apex_experiment::ExperimentConfig;
use clap::Parser;
use rand::Rng;

mod app;
mod export;
mod participant;

use app::App;

/// Headless runner for the cognitive-apathy tapping task.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Participant identifier (selects the block ordering)
    #[arg(value_name = "PARTICIPANT_ID")]
    participant: String,

    /// Path to a JSON experiment config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Output directory for the trial records
    #[arg(long, default_value = "results")]
    out: PathBuf,

    /// Pace trials against the wall clock instead of simulated time
    #[arg(long, default_value_t = false)]
    realtime: bool,

    /// Mean simulated tap rate (taps per second)
    #[arg(long, default_value_t = 4.0)]
    tap_rate: f64,

    /// Probability a simulated trial releases the hold keys early
    #[arg(long, default_value_t = 0.05)]
    release_probability: f64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => ExperimentConfig::from_path(path)?,
        None => ExperimentConfig::default(),
    };
    let seed = args.seed.unwrap_or_else(|| rand::rng().random());

    let app = App::new(config, &args, seed)?;
    app.run()
}
