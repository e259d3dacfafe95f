// mcl_core/src/models/odometry/config.rs

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigurationError;

pub const DEFAULT_MAX_COV_SCALE: f64 = 5.0;
pub const DEFAULT_EXPECTED_TIME_ELAPSED: f64 = 0.1;
pub const DEFAULT_PEAK_MODE_DELTA_PCT: f64 = 0.2;
pub const DEFAULT_NOISE_FLOOR_SCALE: f64 = 0.1;

// =========================================================================
// == Model Variant ==
// =========================================================================

/// The noise model used to perturb odometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModelVariant {
    /// Differential drive, legacy mixing (variances used as deviations).
    Diff,
    /// Omnidirectional drive, legacy mixing.
    Omni,
    DiffCorrected,
    OmniCorrected,
    /// Corrected omni with strafe noise coupled to rotation through alpha6.
    OmniRosie,
    /// Corrected omni scaled up as pose confidence drops.
    OmniScaledVariance,
    /// Corrected omni drawn from two modes offset from the nominal motion.
    OmniBimodal,
    OmniBimodalScaledVariance,
}

impl ModelVariant {
    pub const ALL: [ModelVariant; 8] = [
        ModelVariant::Diff,
        ModelVariant::Omni,
        ModelVariant::DiffCorrected,
        ModelVariant::OmniCorrected,
        ModelVariant::OmniRosie,
        ModelVariant::OmniScaledVariance,
        ModelVariant::OmniBimodal,
        ModelVariant::OmniBimodalScaledVariance,
    ];

    /// `true` for the rotate-translate-rotate (differential drive) family.
    pub fn is_differential(self) -> bool {
        matches!(self, ModelVariant::Diff | ModelVariant::DiffCorrected)
    }

    /// `true` if the noise is scaled by the reading's confidence.
    pub fn uses_confidence(self) -> bool {
        matches!(
            self,
            ModelVariant::OmniScaledVariance | ModelVariant::OmniBimodalScaledVariance
        )
    }

    pub fn is_bimodal(self) -> bool {
        matches!(
            self,
            ModelVariant::OmniBimodal | ModelVariant::OmniBimodalScaledVariance
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModelVariant::Diff => "DIFF",
            ModelVariant::Omni => "OMNI",
            ModelVariant::DiffCorrected => "DIFF_CORRECTED",
            ModelVariant::OmniCorrected => "OMNI_CORRECTED",
            ModelVariant::OmniRosie => "OMNI_ROSIE",
            ModelVariant::OmniScaledVariance => "OMNI_SCALED_VARIANCE",
            ModelVariant::OmniBimodal => "OMNI_BIMODAL",
            ModelVariant::OmniBimodalScaledVariance => "OMNI_BIMODAL_SCALED_VARIANCE",
        }
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =========================================================================
// == Noise Parameters ==
// =========================================================================

/// Drift coefficients and noise-shaping tunables.
///
/// Only a subset of the alphas is read by each variant:
/// * differential: alpha1 (rotation from rotation), alpha2 (rotation from
///   translation), alpha3 (translation from translation), alpha4
///   (translation from rotation);
/// * omni: alpha1 (translation and strafe from rotation), alpha2 (rotation
///   from translation), alpha3 (translation from translation), alpha4
///   (rotation from rotation), alpha5 (strafe from translation);
/// * rosie: as omni, except strafe from rotation is alpha6.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NoiseParameterSet {
    pub alpha1: f64,
    pub alpha2: f64,
    pub alpha3: f64,
    pub alpha4: f64,
    pub alpha5: f64,
    pub alpha6: f64,
    /// Noise scale applied at zero confidence by the scaled-variance variants.
    pub max_cov_scale: f64,
    /// Nominal seconds between odometry updates.
    pub expected_time_elapsed: f64,
    /// Separation of the bimodal peaks as a fraction of the motion.
    pub peak_mode_delta_pct: f64,
    /// Fraction of the unit-motion noise kept as a floor.
    pub noise_floor_scale: f64,
}

impl Default for NoiseParameterSet {
    fn default() -> Self {
        Self::new([0.0; 6])
    }
}

impl NoiseParameterSet {
    /// Creates a parameter set from `[alpha1, .., alpha6]` with default tunables.
    pub fn new(alphas: [f64; 6]) -> Self {
        let [alpha1, alpha2, alpha3, alpha4, alpha5, alpha6] = alphas;
        Self {
            alpha1,
            alpha2,
            alpha3,
            alpha4,
            alpha5,
            alpha6,
            max_cov_scale: DEFAULT_MAX_COV_SCALE,
            expected_time_elapsed: DEFAULT_EXPECTED_TIME_ELAPSED,
            peak_mode_delta_pct: DEFAULT_PEAK_MODE_DELTA_PCT,
            noise_floor_scale: DEFAULT_NOISE_FLOOR_SCALE,
        }
    }

    pub fn with_max_cov_scale(mut self, max_cov_scale: f64) -> Self {
        self.max_cov_scale = max_cov_scale;
        self
    }

    pub fn with_expected_time_elapsed(mut self, expected_time_elapsed: f64) -> Self {
        self.expected_time_elapsed = expected_time_elapsed;
        self
    }

    pub fn with_peak_mode_delta_pct(mut self, peak_mode_delta_pct: f64) -> Self {
        self.peak_mode_delta_pct = peak_mode_delta_pct;
        self
    }

    pub fn with_noise_floor_scale(mut self, noise_floor_scale: f64) -> Self {
        self.noise_floor_scale = noise_floor_scale;
        self
    }

    pub fn alphas(&self) -> [f64; 6] {
        [
            self.alpha1,
            self.alpha2,
            self.alpha3,
            self.alpha4,
            self.alpha5,
            self.alpha6,
        ]
    }

    /// Checks every tunable against its admissible range.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (i, &value) in self.alphas().iter().enumerate() {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigurationError::NegativeAlpha {
                    index: i + 1,
                    value,
                });
            }
        }
        if !(self.max_cov_scale.is_finite() && self.max_cov_scale > 0.0) {
            return Err(ConfigurationError::InvalidMaxCovScale(self.max_cov_scale));
        }
        if !(self.expected_time_elapsed.is_finite() && self.expected_time_elapsed > 0.0) {
            return Err(ConfigurationError::InvalidExpectedTimeElapsed(
                self.expected_time_elapsed,
            ));
        }
        if !(0.0..=1.0).contains(&self.peak_mode_delta_pct) {
            return Err(ConfigurationError::InvalidPeakModeDeltaPct(
                self.peak_mode_delta_pct,
            ));
        }
        if !(self.noise_floor_scale.is_finite() && self.noise_floor_scale >= 0.0) {
            return Err(ConfigurationError::InvalidNoiseFloorScale(
                self.noise_floor_scale,
            ));
        }
        Ok(())
    }
}

/// A complete motion-model configuration: the active variant and its noise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OdometryConfig {
    pub variant: ModelVariant,
    #[serde(default)]
    pub noise: NoiseParameterSet,
}

impl OdometryConfig {
    pub fn new(variant: ModelVariant, noise: NoiseParameterSet) -> Self {
        Self { variant, noise }
    }

    /// Differential drive with legacy mixing; alpha5/alpha6 are zeroed.
    pub fn differential_drive(alpha1: f64, alpha2: f64, alpha3: f64, alpha4: f64) -> Self {
        Self::new(
            ModelVariant::Diff,
            NoiseParameterSet::new([alpha1, alpha2, alpha3, alpha4, 0.0, 0.0]),
        )
    }

    /// Omnidirectional drive with legacy mixing; alpha6 is zeroed.
    pub fn omnidirectional(alpha1: f64, alpha2: f64, alpha3: f64, alpha4: f64, alpha5: f64) -> Self {
        Self::new(
            ModelVariant::Omni,
            NoiseParameterSet::new([alpha1, alpha2, alpha3, alpha4, alpha5, 0.0]),
        )
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.noise.validate()
    }
}
