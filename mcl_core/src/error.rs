// mcl_core/src/error.rs

use thiserror::Error;

/// Rejection reasons for a noise-model configuration.
///
/// Raised synchronously by the configuration entry points. An update never
/// produces one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("drift coefficient alpha{index} must be finite and non-negative, got {value}")]
    NegativeAlpha { index: usize, value: f64 },

    #[error("max_cov_scale must be finite and greater than zero, got {0}")]
    InvalidMaxCovScale(f64),

    #[error("expected_time_elapsed must be finite and greater than zero, got {0}")]
    InvalidExpectedTimeElapsed(f64),

    #[error("peak_mode_delta_pct must lie within [0, 1], got {0}")]
    InvalidPeakModeDeltaPct(f64),

    #[error("noise_floor_scale must be finite and non-negative, got {0}")]
    InvalidNoiseFloorScale(f64),
}
