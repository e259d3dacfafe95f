// mcl_sim/src/main.rs

use anyhow::{Context, Result};
use clap::Parser;
use mcl_sim::prelude::*;
use mcl_sim::DEFAULT_LOG_FILTER;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // --- 1. Logging ---
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    // --- 2. Scenario ---
    let cli = Cli::parse();
    info!("Loading scenario from: {}", cli.scenario.display());
    let mut scenario = ScenarioConfig::load(&cli.scenario)
        .with_context(|| format!("could not load scenario {}", cli.scenario.display()))?;
    cli.apply_overrides(&mut scenario);

    // --- 3. Run ---
    let summary = ScenarioRunner::new(scenario)
        .context("invalid scenario")?
        .run()
        .context("scenario run failed")?;

    info!(
        seed = summary.seed,
        ticks = summary.ticks,
        applied = summary.applied,
        mean_error = summary.mean_error(),
        "Final particle mean {:?}, spread {:?}",
        summary.statistics.mean,
        summary.statistics.std_dev
    );
    Ok(())
}
