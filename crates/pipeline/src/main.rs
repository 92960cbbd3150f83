//! FI back-office pipeline binary.
//!
//! Loads configuration, initializes tracing, optionally generates fresh
//! ingress files, and runs the pipeline engine.

use std::path::PathBuf;

use clap::Parser;

use fi_core::config::AppConfig;
use fi_pipeline::PipelineEngine;

/// FI back-office pipeline
#[derive(Parser, Debug)]
#[command(name = "fi-pipeline", about = "Bond-trading back-office pipeline")]
struct Args {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Generate fresh ingress files before running.
    #[arg(long)]
    generate: bool,

    /// Emit JSON logs instead of human-readable output.
    #[arg(long)]
    json_logs: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    fi_core::logging::init_tracing(args.json_logs);

    let config = AppConfig::load(args.config)?;
    tracing::info!(
        ticker = %config.ticker,
        data_dir = %config.paths.data_dir.display(),
        throttle_ms = config.gui.throttle_ms,
        "starting fi-pipeline"
    );

    let engine = PipelineEngine::new(config);
    if args.generate {
        engine.generate_inputs()?;
    }
    engine.run()
}
