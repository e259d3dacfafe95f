// mcl_core/src/types.rs

use nalgebra::{Isometry2, Rotation2, Vector2, Vector3};
use num_traits::{Float, FloatConst};
use serde::{Deserialize, Serialize};

// --- Core Identifier ---
/// A framework-agnostic identifier for a sensor registered with the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SensorHandle(pub u64);

// --- Angle Helpers ---

/// Wraps an angle into the canonical range `(-pi, pi]`.
pub fn normalize_angle<T: Float + FloatConst>(angle: T) -> T {
    let wrapped = angle.sin().atan2(angle.cos());
    // atan2 may return -pi for a negative-zero sine; fold it onto +pi.
    if wrapped <= -T::PI() {
        -wrapped
    } else {
        wrapped
    }
}

/// Signed shortest rotation that takes `b` onto `a`, in `(-pi, pi]`.
pub fn angle_diff<T: Float + FloatConst>(a: T, b: T) -> T {
    normalize_angle(normalize_angle(a) - normalize_angle(b))
}

// --- Planar Pose ---

/// A planar pose: position in meters and heading in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl Pose2D {
    pub const fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }

    pub const fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn translation(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.theta)
    }

    pub fn to_isometry(&self) -> Isometry2<f64> {
        Isometry2::new(self.translation(), self.theta)
    }

    /// Rigid-body composition `self ⊕ local`.
    ///
    /// `local` is a motion expressed in this pose's own frame. The translation
    /// is rotated into the parent frame and the resulting heading is
    /// normalized.
    pub fn compose(&self, local: &Pose2D) -> Pose2D {
        let offset = Rotation2::new(self.theta) * local.translation();
        Pose2D {
            x: self.x + offset.x,
            y: self.y + offset.y,
            theta: normalize_angle(self.theta + local.theta),
        }
    }

    /// Translation magnitude, ignoring heading.
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.theta.is_finite()
    }
}

impl From<[f64; 3]> for Pose2D {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Vector3<f64>> for Pose2D {
    fn from(v: Vector3<f64>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    const EPSILON: f64 = 1e-12;

    #[test]
    fn normalize_angle_wraps_into_canonical_range() {
        assert_abs_diff_eq!(normalize_angle(3.0 * PI), PI, epsilon = EPSILON);
        assert_abs_diff_eq!(normalize_angle(-3.0 * PI).abs(), PI, epsilon = EPSILON);
        assert_abs_diff_eq!(normalize_angle(-FRAC_PI_2), -FRAC_PI_2, epsilon = EPSILON);
        assert_abs_diff_eq!(normalize_angle(2.5 * PI), FRAC_PI_2, epsilon = EPSILON);
        assert_eq!(normalize_angle(0.0_f64), 0.0);
        assert_eq!(normalize_angle(-PI), PI);
    }

    #[test]
    fn negative_angles_keep_their_sign_in_single_precision() {
        assert_abs_diff_eq!(normalize_angle(-1.0_f32), -1.0_f32, epsilon = 1e-6);
        assert_abs_diff_eq!(angle_diff(-0.5_f32, 0.25_f32), -0.75_f32, epsilon = 1e-6);
    }

    #[test]
    fn angle_diff_takes_the_short_way_around() {
        let d = angle_diff(PI - 0.1, -PI + 0.1);
        assert_abs_diff_eq!(d, -0.2, epsilon = EPSILON);
        assert_abs_diff_eq!(angle_diff(0.3, 0.1), 0.2, epsilon = EPSILON);
    }

    #[test]
    fn compose_moves_along_the_heading() {
        let pose = Pose2D::new(1.0, 2.0, FRAC_PI_2);
        let moved = pose.compose(&Pose2D::new(1.0, 0.0, FRAC_PI_2));
        assert_abs_diff_eq!(moved.x, 1.0, epsilon = EPSILON);
        assert_abs_diff_eq!(moved.y, 3.0, epsilon = EPSILON);
        assert_abs_diff_eq!(moved.theta, PI, epsilon = EPSILON);
    }

    #[test]
    fn compose_matches_isometry_product() {
        let pose = Pose2D::new(-0.5, 4.0, 2.3);
        let local = Pose2D::new(0.7, -0.2, 1.9);
        let composed = pose.compose(&local);
        let expected = pose.to_isometry() * local.to_isometry();
        assert_abs_diff_eq!(composed.x, expected.translation.x, epsilon = EPSILON);
        assert_abs_diff_eq!(composed.y, expected.translation.y, epsilon = EPSILON);
        assert_abs_diff_eq!(
            composed.theta,
            expected.rotation.angle(),
            epsilon = EPSILON
        );
    }

    #[test]
    fn compose_with_identity_heading_is_exact() {
        let moved = Pose2D::identity().compose(&Pose2D::new(1.0, 0.0, 0.0));
        assert_eq!(moved, Pose2D::new(1.0, 0.0, 0.0));
    }
}
