// mcl_sim/src/lib.rs

//! Headless driver for the `mcl_core` motion models: loads a scenario,
//! replays its odometry through a particle cloud and reports how the cloud
//! evolves.

pub mod cli;
pub mod config;
pub mod prelude;
pub mod runner;

/// Log filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,mcl_core=debug,mcl_sim=debug";
