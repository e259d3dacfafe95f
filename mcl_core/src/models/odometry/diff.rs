// mcl_core/src/models/odometry/diff.rs

//! Rotate-translate-rotate decomposition for differential-drive odometry.

use nalgebra::Vector3;
use std::f64::consts::PI;

use super::config::NoiseParameterSet;
use crate::types::{angle_diff, Pose2D};

/// Below this translation (meters) the direction of travel is meaningless and
/// the whole heading change is attributed to the final rotation.
pub const MIN_TRANSLATION_FOR_BEARING: f64 = 0.01;

/// A relative motion split into an initial turn, a straight segment and a
/// final turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffMotion {
    pub rot1: f64,
    pub trans: f64,
    pub rot2: f64,
}

impl DiffMotion {
    pub fn decompose(delta: &Pose2D) -> Self {
        let trans = delta.norm();
        let rot1 = if trans < MIN_TRANSLATION_FOR_BEARING {
            0.0
        } else {
            delta.y.atan2(delta.x)
        };
        Self {
            rot1,
            trans,
            rot2: angle_diff(delta.theta, rot1),
        }
    }

    /// One meter of travel bracketed by two one-radian turns.
    pub fn unit() -> Self {
        Self {
            rot1: 1.0,
            trans: 1.0,
            rot2: 1.0,
        }
    }

    /// Recomposes noisy components into a motion in the robot frame.
    pub fn to_local(rot1: f64, trans: f64, rot2: f64) -> Pose2D {
        Pose2D::new(trans * rot1.cos(), trans * rot1.sin(), rot1 + rot2)
    }
}

/// Rotation magnitude used for noise, folded so that driving backwards is not
/// mistaken for a half turn.
fn rotation_noise_magnitude(rot: f64) -> f64 {
    angle_diff(rot, 0.0).abs().min(angle_diff(rot, PI).abs())
}

/// Variances of `[rot1, trans, rot2]`.
fn variances(motion: &DiffMotion, params: &NoiseParameterSet) -> Vector3<f64> {
    let r1 = rotation_noise_magnitude(motion.rot1).powi(2);
    let r2 = rotation_noise_magnitude(motion.rot2).powi(2);
    let t = motion.trans.powi(2);
    Vector3::new(
        params.alpha1 * r1 + params.alpha2 * t,
        params.alpha3 * t + params.alpha4 * r1 + params.alpha4 * r2,
        params.alpha1 * r2 + params.alpha2 * t,
    )
}

/// Legacy mixing: the variance mixture is used directly as the deviation.
pub fn legacy_deviations(motion: &DiffMotion, params: &NoiseParameterSet) -> Vector3<f64> {
    variances(motion, params)
}

pub fn corrected_deviations(motion: &DiffMotion, params: &NoiseParameterSet) -> Vector3<f64> {
    variances(motion, params).map(f64::sqrt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn straight_motion_has_no_turns() {
        let m = DiffMotion::decompose(&Pose2D::new(2.0, 0.0, 0.0));
        assert_eq!(m, DiffMotion { rot1: 0.0, trans: 2.0, rot2: 0.0 });
    }

    #[test]
    fn sideways_motion_turns_then_turns_back() {
        let m = DiffMotion::decompose(&Pose2D::new(0.0, 1.0, 0.0));
        assert_abs_diff_eq!(m.rot1, FRAC_PI_2, epsilon = 1e-12);
        assert_abs_diff_eq!(m.trans, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m.rot2, -FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn tiny_translation_falls_back_to_raw_heading() {
        let m = DiffMotion::decompose(&Pose2D::new(0.001, -0.002, 0.4));
        assert_eq!(m.rot1, 0.0);
        assert_abs_diff_eq!(m.rot2, 0.4, epsilon = 1e-12);
    }

    #[test]
    fn decomposition_round_trips_through_local_motion() {
        let delta = Pose2D::new(0.3, -0.4, 0.25);
        let m = DiffMotion::decompose(&delta);
        let local = DiffMotion::to_local(m.rot1, m.trans, m.rot2);
        assert_abs_diff_eq!(local.x, delta.x, epsilon = 1e-12);
        assert_abs_diff_eq!(local.y, delta.y, epsilon = 1e-12);
        assert_abs_diff_eq!(angle_diff(local.theta, delta.theta), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn reversing_adds_no_rotation_noise() {
        let params = NoiseParameterSet::new([1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let m = DiffMotion::decompose(&Pose2D::new(-1.0, 0.0, 0.0));
        let sigma = corrected_deviations(&m, &params);
        assert_abs_diff_eq!(sigma.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(sigma.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn corrected_is_square_root_of_legacy() {
        let params = NoiseParameterSet::new([0.2, 0.1, 0.3, 0.05, 0.0, 0.0]);
        let m = DiffMotion::decompose(&Pose2D::new(0.5, 0.1, 0.2));
        let legacy = legacy_deviations(&m, &params);
        let corrected = corrected_deviations(&m, &params);
        for i in 0..3 {
            assert_abs_diff_eq!(corrected[i] * corrected[i], legacy[i], epsilon = 1e-12);
        }
        // For sub-meter motion the corrected noise is the larger one.
        assert!(corrected.x > legacy.x);
    }
}
