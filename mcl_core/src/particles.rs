// mcl_core/src/particles.rs

use nalgebra::Vector3;

use crate::types::{normalize_angle, Pose2D};

/// A single pose hypothesis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub pose: Pose2D,
    pub weight: f64,
}

/// The contract for the particle collection a motion model updates.
///
/// Storage, weighting and resampling belong to the implementor. Motion models
/// only read the count and rewrite poses, visiting them in index order.
pub trait ParticleSet {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn pose(&self, index: usize) -> &Pose2D;

    fn pose_mut(&mut self, index: usize) -> &mut Pose2D;
}

/// A `Vec`-backed particle set with uniform initial weights.
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    samples: Vec<Particle>,
}

impl SampleSet {
    /// Creates `count` particles stacked on `pose`.
    pub fn new(count: usize, pose: Pose2D) -> Self {
        Self::from_poses(std::iter::repeat(pose).take(count))
    }

    pub fn from_poses(poses: impl IntoIterator<Item = Pose2D>) -> Self {
        let mut samples: Vec<Particle> = poses
            .into_iter()
            .map(|pose| Particle { pose, weight: 0.0 })
            .collect();
        let weight = 1.0 / samples.len().max(1) as f64;
        for sample in &mut samples {
            sample.weight = weight;
        }
        Self { samples }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.samples
    }

    pub fn poses(&self) -> impl Iterator<Item = &Pose2D> + Clone {
        self.samples.iter().map(|s| &s.pose)
    }

    /// Weighted pose statistics; `None` for an empty set or zero total weight.
    pub fn statistics(&self) -> Option<PoseStatistics> {
        PoseStatistics::from_particles(&self.samples)
    }
}

impl ParticleSet for SampleSet {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn pose(&self, index: usize) -> &Pose2D {
        &self.samples[index].pose
    }

    fn pose_mut(&mut self, index: usize) -> &mut Pose2D {
        &mut self.samples[index].pose
    }
}

/// Weighted mean and per-axis spread of a particle cloud.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseStatistics {
    pub mean: Pose2D,
    /// Standard deviation of `[x, y, theta]`. The heading spread is computed
    /// from angular differences to the circular mean.
    pub std_dev: Vector3<f64>,
}

impl PoseStatistics {
    pub fn from_particles(particles: &[Particle]) -> Option<Self> {
        let total: f64 = particles.iter().map(|p| p.weight).sum();
        if particles.is_empty() || total <= 0.0 {
            return None;
        }

        // Headings are averaged on the unit circle so that a cloud straddling
        // +/-pi does not average to zero.
        let (mut x, mut y, mut cos, mut sin) = (0.0, 0.0, 0.0, 0.0);
        for p in particles {
            let w = p.weight / total;
            x += w * p.pose.x;
            y += w * p.pose.y;
            cos += w * p.pose.theta.cos();
            sin += w * p.pose.theta.sin();
        }
        let mean = Pose2D::new(x, y, sin.atan2(cos));

        let mut variance = Vector3::zeros();
        for p in particles {
            let w = p.weight / total;
            let d = Vector3::new(
                p.pose.x - mean.x,
                p.pose.y - mean.y,
                normalize_angle(p.pose.theta - mean.theta),
            );
            variance += d.component_mul(&d) * w;
        }

        Some(Self {
            mean,
            std_dev: variance.map(f64::sqrt),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn new_set_has_uniform_weights() {
        let set = SampleSet::new(4, Pose2D::new(1.0, 2.0, 0.5));
        assert_eq!(set.len(), 4);
        for p in set.particles() {
            assert_abs_diff_eq!(p.weight, 0.25);
            assert_eq!(p.pose, Pose2D::new(1.0, 2.0, 0.5));
        }
    }

    #[test]
    fn statistics_of_identical_particles_have_zero_spread() {
        let set = SampleSet::new(10, Pose2D::new(-3.0, 0.5, 1.0));
        let stats = set.statistics().unwrap();
        assert_abs_diff_eq!(stats.mean.x, -3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(stats.mean.theta, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(stats.std_dev.norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn heading_mean_wraps_around_pi() {
        let set = SampleSet::from_poses([
            Pose2D::new(0.0, 0.0, PI - 0.1),
            Pose2D::new(0.0, 0.0, -PI + 0.1),
        ]);
        let stats = set.statistics().unwrap();
        assert_abs_diff_eq!(stats.mean.theta.abs(), PI, epsilon = 1e-9);
        assert_abs_diff_eq!(stats.std_dev.z, 0.1, epsilon = 1e-9);
    }

    #[test]
    fn empty_set_has_no_statistics() {
        assert!(SampleSet::default().statistics().is_none());
    }
}
