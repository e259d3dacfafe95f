// mcl_sim/src/prelude.rs

// Re-export the entire mcl_core prelude so binaries only need one import.
pub use mcl_core::prelude::*;

// Simulation-specific types.
pub use crate::cli::Cli;
pub use crate::config::{MotionSegment, Particles, ScenarioConfig, ScenarioError, Simulation};
pub use crate::runner::{RunSummary, ScenarioRunner, WHEEL_ODOMETRY};
