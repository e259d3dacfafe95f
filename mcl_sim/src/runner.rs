// mcl_sim/src/runner.rs

use mcl_core::prelude::*;
use nalgebra::Vector3;
use rand::rngs::OsRng;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::config::{MotionSegment, ScenarioConfig, ScenarioError};

/// The handle the wheel odometry model is registered under.
pub const WHEEL_ODOMETRY: SensorHandle = SensorHandle(0);

/// Final state of a scenario run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// The seed the sampler ran with, whether configured or drawn.
    pub seed: u64,
    pub ticks: u32,
    /// Ticks on which the motion model actually moved the particles.
    pub applied: u32,
    /// Where the odometry alone puts the robot.
    pub odometry_pose: Pose2D,
    pub statistics: PoseStatistics,
}

impl RunSummary {
    /// Distance between the particle mean and the odometry pose.
    pub fn mean_error(&self) -> f64 {
        (self.statistics.mean.translation() - self.odometry_pose.translation()).norm()
    }
}

/// Replays a scenario's motion segments through a registered odometry model.
#[derive(Debug)]
pub struct ScenarioRunner {
    scenario: ScenarioConfig,
    seed: u64,
    particles: SampleSet,
    registry: SensorRegistry,
    odometry_pose: Pose2D,
    elapsed: f64,
}

impl ScenarioRunner {
    pub fn new(scenario: ScenarioConfig) -> Result<Self, ScenarioError> {
        scenario.validate()?;

        // --- Deterministic sampler ---
        let seed = match scenario.simulation.seed {
            Some(seed) => seed,
            None => {
                let seed = OsRng.next_u64();
                info!(seed, "No seed configured, drew one from the OS");
                seed
            }
        };
        let rng = ChaCha8Rng::seed_from_u64(seed);
        let model = OdometryModel::with_rng(scenario.odometry, rng)?;

        let mut registry = SensorRegistry::new();
        registry.register(WHEEL_ODOMETRY, Box::new(model));

        let start = scenario.particles.initial_pose();
        let particles = SampleSet::new(scenario.particles.count, start);
        debug!(
            variant = %scenario.odometry.variant,
            particles = particles.len(),
            seed,
            "Scenario runner ready"
        );

        Ok(Self {
            scenario,
            seed,
            particles,
            registry,
            odometry_pose: start,
            elapsed: 0.0,
        })
    }

    pub fn particles(&self) -> &SampleSet {
        &self.particles
    }

    pub fn registry_mut(&mut self) -> &mut SensorRegistry {
        &mut self.registry
    }

    /// Runs every motion segment to completion.
    pub fn run(mut self) -> Result<RunSummary, ScenarioError> {
        let report_interval = self.scenario.simulation.report_interval;
        let segments = std::mem::take(&mut self.scenario.motion);
        let (mut ticks, mut applied) = (0u32, 0u32);

        info!(
            scenario_ticks = segments.iter().map(|s| s.ticks).sum::<u32>(),
            variant = %self.scenario.odometry.variant,
            "Starting scenario"
        );
        for segment in &segments {
            for _ in 0..segment.ticks {
                if self.step(segment) {
                    applied += 1;
                }
                ticks += 1;
                if ticks % report_interval == 0 {
                    self.report(ticks)?;
                }
            }
        }

        let statistics = self.statistics()?;
        info!(
            ticks,
            applied,
            mean = ?statistics.mean,
            spread = ?statistics.std_dev,
            "Scenario complete"
        );
        Ok(RunSummary {
            seed: self.seed,
            ticks,
            applied,
            odometry_pose: self.odometry_pose,
            statistics,
        })
    }

    /// Feeds one odometry reading for `segment`. Returns whether the
    /// particles moved.
    pub fn step(&mut self, segment: &MotionSegment) -> bool {
        let period = self.scenario.simulation.update_period;
        let delta = segment.delta();
        self.odometry_pose = self.odometry_pose.compose(&delta);
        self.elapsed += period;

        let reading = OdometryReading::new(self.odometry_pose, delta, period)
            .with_confidence(segment.confidence);
        let mut data = SensorData::from(reading);
        let moved = self
            .registry
            .apply_action(WHEEL_ODOMETRY, &mut self.particles, &mut data);

        if let Some(reading) = data.as_odometry() {
            if reading.multiplier() > 1.0 {
                debug!(
                    confidence = reading.confidence,
                    multiplier = reading.multiplier(),
                    "Low-confidence odometry inflated the motion noise"
                );
            }
        }
        moved
    }

    fn statistics(&self) -> Result<PoseStatistics, ScenarioError> {
        self.particles.statistics().ok_or(ScenarioError::NoParticles)
    }

    fn report(&self, tick: u32) -> Result<(), ScenarioError> {
        let stats = self.statistics()?;
        let spread: Vector3<f64> = stats.std_dev;
        if spread.iter().any(|s| !s.is_finite()) {
            warn!(tick, "Particle spread is no longer finite");
        }
        info!(
            tick,
            t = self.elapsed,
            x = stats.mean.x,
            y = stats.mean.y,
            theta = stats.mean.theta,
            sigma_x = spread.x,
            sigma_y = spread.y,
            sigma_theta = spread.z,
            "Particle cloud"
        );
        Ok(())
    }
}
