// mcl_core/src/models/odometry/omni.rs

//! Translate-strafe-rotate decomposition for holonomic odometry.

use nalgebra::Vector3;

use super::config::NoiseParameterSet;
use crate::types::Pose2D;

/// A relative motion split into travel along a bearing and a heading change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OmniMotion {
    pub trans: f64,
    /// Direction of travel relative to the robot heading at the start.
    pub bearing: f64,
    pub rot: f64,
}

impl OmniMotion {
    pub fn decompose(delta: &Pose2D) -> Self {
        Self {
            trans: delta.norm(),
            bearing: delta.y.atan2(delta.x),
            rot: delta.theta,
        }
    }

    /// One meter of travel straight ahead with a one-radian turn.
    pub fn unit() -> Self {
        Self {
            trans: 1.0,
            bearing: 0.0,
            rot: 1.0,
        }
    }

    /// Recomposes noisy components into a motion in the robot frame. Strafe is
    /// measured to the right of the bearing.
    pub fn to_local(&self, trans: f64, strafe: f64, rot: f64) -> Pose2D {
        let (sn, cs) = self.bearing.sin_cos();
        Pose2D::new(trans * cs + strafe * sn, trans * sn - strafe * cs, rot)
    }
}

/// Variances of `[trans, strafe, rot]`. `strafe_from_rot` is the coefficient
/// coupling strafe noise to rotation.
fn variances(motion: &OmniMotion, params: &NoiseParameterSet, strafe_from_rot: f64) -> Vector3<f64> {
    let t = motion.trans.powi(2);
    let r = motion.rot.powi(2);
    Vector3::new(
        params.alpha3 * t + params.alpha1 * r,
        strafe_from_rot * r + params.alpha5 * t,
        params.alpha4 * r + params.alpha2 * t,
    )
}

/// Legacy mixing: the variance mixture is used directly as the deviation.
pub fn legacy_deviations(motion: &OmniMotion, params: &NoiseParameterSet) -> Vector3<f64> {
    variances(motion, params, params.alpha1)
}

pub fn corrected_deviations(motion: &OmniMotion, params: &NoiseParameterSet) -> Vector3<f64> {
    variances(motion, params, params.alpha1).map(f64::sqrt)
}

/// Corrected mixing with strafe decoupled from alpha1 and driven by alpha6.
pub fn rosie_deviations(motion: &OmniMotion, params: &NoiseParameterSet) -> Vector3<f64> {
    variances(motion, params, params.alpha6).map(f64::sqrt)
}
