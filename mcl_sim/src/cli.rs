// mcl_sim/src/cli.rs

use clap::Parser;
use std::path::PathBuf;

use crate::config::ScenarioConfig;

/// Replays odometry scenarios through the particle filter motion models.
///
/// This struct defines the command-line arguments accepted by the
/// `mcl_sim` binary.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "assets/scenarios/stationary_diff.toml")]
    pub scenario: PathBuf,

    /// Seed for the sampler, overriding the scenario's `[simulation] seed`.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of particles, overriding the scenario's `[particles] count`.
    #[arg(short, long)]
    pub particles: Option<usize>,
}

impl Cli {
    /// Applies the command-line overrides on top of a loaded scenario.
    pub fn apply_overrides(&self, scenario: &mut ScenarioConfig) {
        if let Some(seed) = self.seed {
            scenario.simulation.seed = Some(seed);
        }
        if let Some(count) = self.particles {
            scenario.particles.count = count;
        }
    }
}
