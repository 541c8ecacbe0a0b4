//! Sagecast training entrypoint CLI
//!
//! Decodes the hyperparameters of a SageMaker training job into a nested
//! estimator configuration for the forecasting library.

use anyhow::{Context, Result};
use clap::Parser;
use sagecast_entrypoint::{run, split_known_args, Args};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    let argv: Vec<String> = std::env::args().collect();
    let (known, hp_tokens) = split_known_args(argv.clone());
    let args = Args::parse_from(known);

    // Setup logging; RUST_LOG overrides the verbosity flag
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Sagecast training entrypoint v{}", env!("CARGO_PKG_VERSION"));
    info!("═══════════════════════════════════════════");
    info!("CLI args to entrypoint script: {:?}", argv);
    info!("Estimator hyperparameter tokens: {:?}", hp_tokens);

    let report = run(&args, &hp_tokens).context("Training entrypoint failed")?;

    info!("═══════════════════════════════════════════");
    match report.stopped_before {
        Some(milestone) => info!("✓ Stopped before {:?}", milestone),
        None => info!("✓ Estimator configuration decoded successfully"),
    }
    if let Some(path) = &report.manifest_path {
        info!("  Estimator: {}", path.display());
    }
    if let Some(path) = &report.transform_path {
        info!("  Transform: {}", path.display());
    }
    if let Some(path) = &report.evaluation_path {
        info!("  Evaluation plan: {}", path.display());
    }

    Ok(())
}
