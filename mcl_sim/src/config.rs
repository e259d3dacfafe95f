// mcl_sim/src/config.rs

//! Scenario files: what to simulate, loaded from TOML and validated before
//! anything runs.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Format, Toml},
    Figment,
};
use mcl_core::prelude::{ConfigurationError, OdometryConfig, Pose2D};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario file '{0}' does not exist")]
    NotFound(PathBuf),

    #[error("failed to load scenario '{path}': {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: Box<figment::Error>,
    },

    #[error("failed to parse scenario: {0}")]
    Parse(#[source] Box<figment::Error>),

    #[error("invalid odometry parameters: {0}")]
    Odometry(#[from] ConfigurationError),

    #[error("update period must be positive and finite, got {0}")]
    InvalidUpdatePeriod(f64),

    #[error("report interval must be at least one tick")]
    InvalidReportInterval,

    #[error("a scenario needs at least one particle")]
    NoParticles,

    #[error("initial pose must be finite, got {0:?}")]
    InvalidInitialPose([f64; 3]),

    #[error("motion segment {index} has a non-finite delta or confidence")]
    InvalidSegment { index: usize },
}

// =========================================================================
// == Top-Level Scenario ==
// =========================================================================

/// The root of the data parsed from a `scenario.toml` file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)] // Fail if the TOML has fields not in our struct
pub struct ScenarioConfig {
    #[serde(default)] // Use default if the [simulation] section is missing
    pub simulation: Simulation,

    #[serde(default)]
    pub particles: Particles,

    pub odometry: OdometryConfig,

    // The TOML has `[[motion]]`, which becomes a Vec of segments.
    #[serde(default)]
    pub motion: Vec<MotionSegment>,
}

impl ScenarioConfig {
    /// Loads and validates the scenario at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        // A missing file would otherwise be read as an empty document.
        if !path.is_file() {
            return Err(ScenarioError::NotFound(path.to_path_buf()));
        }
        let config: Self = Figment::new()
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| ScenarioError::Load {
                path: path.to_path_buf(),
                source: Box::new(e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a scenario held in memory.
    pub fn from_toml(source: &str) -> Result<Self, ScenarioError> {
        let config: Self = Figment::new()
            .merge(Toml::string(source))
            .extract()
            .map_err(|e| ScenarioError::Parse(Box::new(e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        let period = self.simulation.update_period;
        if !(period.is_finite() && period > 0.0) {
            return Err(ScenarioError::InvalidUpdatePeriod(period));
        }
        if self.simulation.report_interval == 0 {
            return Err(ScenarioError::InvalidReportInterval);
        }
        if self.particles.count == 0 {
            return Err(ScenarioError::NoParticles);
        }
        if !self.particles.initial_pose().is_finite() {
            return Err(ScenarioError::InvalidInitialPose(self.particles.initial_pose));
        }
        for (index, segment) in self.motion.iter().enumerate() {
            if !(segment.delta().is_finite() && segment.confidence.is_finite()) {
                return Err(ScenarioError::InvalidSegment { index });
            }
        }
        self.odometry.validate()?;
        Ok(())
    }

    /// Total number of update ticks across all motion segments.
    pub fn total_ticks(&self) -> u32 {
        self.motion.iter().map(|s| s.ticks).sum()
    }
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Simulation {
    /// Optional seed for the sampler. A random one is drawn (and logged) when
    /// absent.
    pub seed: Option<u64>,
    /// Seconds between odometry readings.
    #[serde(default = "default_update_period")]
    pub update_period: f64,
    /// Ticks between two statistics reports.
    #[serde(default = "default_report_interval")]
    pub report_interval: u32,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            seed: None,
            update_period: default_update_period(),
            report_interval: default_report_interval(),
        }
    }
}

fn default_update_period() -> f64 {
    0.1
}

fn default_report_interval() -> u32 {
    10
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Particles {
    #[serde(default = "default_particle_count")]
    pub count: usize,
    /// `[x, y, theta]` every particle starts from.
    #[serde(default)]
    pub initial_pose: [f64; 3],
}

impl Particles {
    pub fn initial_pose(&self) -> Pose2D {
        self.initial_pose.into()
    }
}

impl Default for Particles {
    fn default() -> Self {
        Self {
            count: default_particle_count(),
            initial_pose: [0.0; 3],
        }
    }
}

fn default_particle_count() -> usize {
    500
}

/// A run of identical odometry readings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MotionSegment {
    pub ticks: u32,
    /// `[dx, dy, dtheta]` per tick, in the robot frame.
    #[serde(default)]
    pub delta: [f64; 3],
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

impl MotionSegment {
    pub fn delta(&self) -> Pose2D {
        self.delta.into()
    }
}

fn default_confidence() -> f64 {
    1.0
}
