// mcl_core/src/models/odometry/mod.rs

//! The odometry motion model: perturbs every particle by a noisy copy of the
//! measured relative motion.

pub mod config;
pub mod diff;
pub mod omni;
pub mod sampler;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::any::Any;
use tracing::{debug, trace, warn};

use crate::error::ConfigurationError;
use crate::messages::{OdometryReading, SensorData};
use crate::models::SensorModel;
use crate::particles::ParticleSet;

pub use config::{ModelVariant, NoiseParameterSet, OdometryConfig};
pub use sampler::{MotionModelSelector, MotionRoutine, NoiseProfile, Sampler};

/// Translation (m) and rotation (rad) below which a delta counts as no motion.
pub const NEGLIGIBLE_MOTION: f64 = 1e-9;

/// An odometry-driven action model for a 2D particle filter.
#[derive(Debug, Clone)]
pub struct OdometryModel<R = ChaCha8Rng> {
    config: OdometryConfig,
    routine: MotionRoutine,
    sampler: Sampler<R>,
}

impl OdometryModel<ChaCha8Rng> {
    /// Creates a model seeded from the operating system's entropy source.
    pub fn new(config: OdometryConfig) -> Result<Self, ConfigurationError> {
        Self::with_rng(config, ChaCha8Rng::from_entropy())
    }

    /// Creates a model whose noise stream is fully determined by `seed`.
    pub fn from_seed(config: OdometryConfig, seed: u64) -> Result<Self, ConfigurationError> {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> OdometryModel<R> {
    /// Creates a model drawing its noise from `rng`.
    pub fn with_rng(config: OdometryConfig, rng: R) -> Result<Self, ConfigurationError> {
        config.validate()?;
        debug!(variant = %config.variant, noise = ?config.noise, "Odometry model configured");
        Ok(Self {
            config,
            routine: MotionModelSelector::select(config.variant),
            sampler: Sampler::new(rng),
        })
    }

    // --- Configuration ---

    /// Selects `variant` with `noise`. On error the active configuration is
    /// left untouched.
    pub fn configure(
        &mut self,
        variant: ModelVariant,
        noise: NoiseParameterSet,
    ) -> Result<(), ConfigurationError> {
        self.apply(OdometryConfig::new(variant, noise))
    }

    /// Selects the legacy differential-drive model with default tunables.
    pub fn configure_differential_drive(
        &mut self,
        alpha1: f64,
        alpha2: f64,
        alpha3: f64,
        alpha4: f64,
    ) -> Result<(), ConfigurationError> {
        self.apply(OdometryConfig::differential_drive(alpha1, alpha2, alpha3, alpha4))
    }

    /// Selects the legacy omnidirectional model with default tunables.
    pub fn configure_omnidirectional(
        &mut self,
        alpha1: f64,
        alpha2: f64,
        alpha3: f64,
        alpha4: f64,
        alpha5: f64,
    ) -> Result<(), ConfigurationError> {
        self.apply(OdometryConfig::omnidirectional(
            alpha1, alpha2, alpha3, alpha4, alpha5,
        ))
    }

    fn apply(&mut self, config: OdometryConfig) -> Result<(), ConfigurationError> {
        config.validate()?;
        debug!(variant = %config.variant, noise = ?config.noise, "Odometry model reconfigured");
        self.routine = MotionModelSelector::select(config.variant);
        self.config = config;
        Ok(())
    }

    pub fn config(&self) -> &OdometryConfig {
        &self.config
    }

    pub fn variant(&self) -> ModelVariant {
        self.config.variant
    }

    pub fn params(&self) -> &NoiseParameterSet {
        &self.config.noise
    }

    pub fn sampler_mut(&mut self) -> &mut Sampler<R> {
        &mut self.sampler
    }

    // --- Update ---

    /// The noise the next update with `reading` would draw from.
    pub fn noise_profile(&self, reading: &OdometryReading) -> NoiseProfile {
        NoiseProfile::new(&self.routine, &self.config.noise, reading)
    }

    /// Moves every particle by an independently perturbed copy of
    /// `reading.delta`.
    ///
    /// Returns `false`, leaving the particles untouched, when no time has
    /// elapsed, when the reading is not finite, or when the robot did not move
    /// and the noise floor is zero. Also records the confidence multiplier on
    /// the reading.
    pub fn apply_odometry(
        &mut self,
        particles: &mut dyn ParticleSet,
        reading: &mut OdometryReading,
    ) -> bool {
        if !(reading.time_elapsed.is_finite() && reading.time_elapsed > 0.0) {
            trace!(time_elapsed = reading.time_elapsed, "No time elapsed, skipping odometry update");
            return false;
        }
        if !reading.delta.is_finite() {
            warn!(delta = ?reading.delta, "Non-finite odometry delta, skipping update");
            return false;
        }

        let profile = self.noise_profile(reading);
        let stationary = reading.delta.norm() < NEGLIGIBLE_MOTION
            && reading.delta.theta.abs() < NEGLIGIBLE_MOTION;
        if stationary && profile.floor.max() <= 0.0 {
            trace!("Stationary reading with no noise floor, skipping odometry update");
            return false;
        }

        reading.set_multiplier(profile.multiplier);
        trace!(
            variant = %self.config.variant,
            particles = particles.len(),
            deviations = ?profile.deviations,
            multiplier = profile.multiplier,
            "Applying odometry update"
        );

        for i in 0..particles.len() {
            let local = self.sampler.sample(&profile);
            let pose = particles.pose_mut(i);
            *pose = pose.compose(&local);
        }
        true
    }
}

impl<R> SensorModel for OdometryModel<R>
where
    R: Rng + Clone + std::fmt::Debug + Send + Sync + 'static,
{
    fn is_action(&self) -> bool {
        true
    }

    fn update_action(&mut self, particles: &mut dyn ParticleSet, data: &mut SensorData) -> bool {
        match data.as_odometry_mut() {
            Some(reading) => self.apply_odometry(particles, reading),
            None => false,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
