// mcl_core/src/models/odometry/sampler.rs

use nalgebra::Vector3;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

use super::config::{ModelVariant, NoiseParameterSet};
use super::diff::{self, DiffMotion};
use super::omni::{self, OmniMotion};
use crate::messages::OdometryReading;
use crate::types::Pose2D;

// =========================================================================
// == Variant Dispatch ==
// =========================================================================

type DiffMixing = fn(&DiffMotion, &NoiseParameterSet) -> Vector3<f64>;
type OmniMixing = fn(&OmniMotion, &NoiseParameterSet) -> Vector3<f64>;

/// The noise-mixing routine of a variant, tagged with the decomposition it
/// operates on.
#[derive(Debug, Clone, Copy)]
pub enum Mixing {
    Diff(DiffMixing),
    Omni(OmniMixing),
}

/// Everything that distinguishes one variant's sampling from another's.
#[derive(Debug, Clone, Copy)]
pub struct MotionRoutine {
    pub variant: ModelVariant,
    pub mixing: Mixing,
    pub confidence_scaled: bool,
    pub bimodal: bool,
}

/// Maps a configured variant onto the routine that implements it.
pub struct MotionModelSelector;

impl MotionModelSelector {
    pub fn select(variant: ModelVariant) -> MotionRoutine {
        let (mixing, confidence_scaled, bimodal) = match variant {
            ModelVariant::Diff => (Mixing::Diff(diff::legacy_deviations), false, false),
            ModelVariant::DiffCorrected => (Mixing::Diff(diff::corrected_deviations), false, false),
            ModelVariant::Omni => (Mixing::Omni(omni::legacy_deviations), false, false),
            ModelVariant::OmniCorrected => (Mixing::Omni(omni::corrected_deviations), false, false),
            ModelVariant::OmniRosie => (Mixing::Omni(omni::rosie_deviations), false, false),
            ModelVariant::OmniScaledVariance => {
                (Mixing::Omni(omni::corrected_deviations), true, false)
            }
            ModelVariant::OmniBimodal => (Mixing::Omni(omni::corrected_deviations), false, true),
            ModelVariant::OmniBimodalScaledVariance => {
                (Mixing::Omni(omni::corrected_deviations), true, true)
            }
        };
        MotionRoutine {
            variant,
            mixing,
            confidence_scaled,
            bimodal,
        }
    }
}

// =========================================================================
// == Noise Profile ==
// =========================================================================

/// A decomposed motion, in whichever form the active variant uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Diff(DiffMotion),
    Omni(OmniMotion),
}

/// The deterministic part of one update: the nominal motion and the noise to
/// draw around it. Shared by every particle of that update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseProfile {
    pub motion: Motion,
    /// Standard deviations actually sampled, floor included. Ordered
    /// `[rot1, trans, rot2]` for differential motion and
    /// `[trans, strafe, rot]` for omni motion.
    pub deviations: Vector3<f64>,
    /// The floor the deviations were clamped to. Positive on every axis
    /// whenever `noise_floor_scale` and the elapsed time are.
    pub floor: Vector3<f64>,
    /// Confidence multiplier applied before the floor.
    pub multiplier: f64,
    /// Whether each draw picks one of two modes.
    pub bimodal: bool,
    /// Mean offset of the positive bimodal peak, same ordering as
    /// `deviations`. Zero for unimodal variants.
    pub mode_offset: Vector3<f64>,
}

impl NoiseProfile {
    /// Computes the profile for `reading` under `routine`.
    pub fn new(routine: &MotionRoutine, params: &NoiseParameterSet, reading: &OdometryReading) -> Self {
        let (motion, base, unit) = match routine.mixing {
            Mixing::Diff(mix) => {
                let motion = DiffMotion::decompose(&reading.delta);
                (
                    Motion::Diff(motion),
                    mix(&motion, params),
                    mix(&DiffMotion::unit(), params),
                )
            }
            Mixing::Omni(mix) => {
                let motion = OmniMotion::decompose(&reading.delta);
                (
                    Motion::Omni(motion),
                    mix(&motion, params),
                    mix(&OmniMotion::unit(), params),
                )
            }
        };

        let multiplier = if routine.confidence_scaled {
            confidence_multiplier(params.max_cov_scale, reading.confidence)
        } else {
            1.0
        };

        // The unit-motion noise only raises the floor; zero alphas still leave
        // `noise_floor_scale` per axis.
        let time_ratio = reading.time_elapsed.max(0.0) / params.expected_time_elapsed;
        let floor = unit.map(|s| s.max(1.0)) * (params.noise_floor_scale * time_ratio.sqrt());
        let deviations = (base * multiplier).zip_map(&floor, f64::max);

        let mode_offset = match motion {
            Motion::Omni(m) if routine.bimodal => {
                Vector3::new(m.trans.abs(), 0.0, m.rot.abs()) * params.peak_mode_delta_pct
            }
            _ => Vector3::zeros(),
        };

        Self {
            motion,
            deviations,
            floor,
            multiplier,
            bimodal: routine.bimodal,
            mode_offset,
        }
    }
}

/// `1` at full confidence, rising linearly to `max_cov_scale` at zero.
/// Confidence outside `[0, 1]` is clamped; a non-finite confidence counts as
/// zero.
pub fn confidence_multiplier(max_cov_scale: f64, confidence: f64) -> f64 {
    let confidence = if confidence.is_finite() {
        confidence.clamp(0.0, 1.0)
    } else {
        0.0
    };
    1.0 + (max_cov_scale - 1.0) * (1.0 - confidence)
}

// =========================================================================
// == Sampler ==
// =========================================================================

/// Draws per-particle motions from a `NoiseProfile`.
///
/// The sampler owns its random source. Draws happen in a fixed order (mode
/// choice first for bimodal profiles, then the three components in profile
/// order), so a seeded source reproduces the same particle cloud.
#[derive(Debug, Clone)]
pub struct Sampler<R = ChaCha8Rng> {
    rng: R,
}

impl<R: Rng> Sampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Replaces the random source, returning the previous one.
    pub fn replace_rng(&mut self, rng: R) -> R {
        std::mem::replace(&mut self.rng, rng)
    }

    /// Draws one noisy motion, expressed in the particle's own frame.
    pub fn sample(&mut self, profile: &NoiseProfile) -> Pose2D {
        let sign = if !profile.bimodal {
            0.0
        } else if self.rng.gen_bool(0.5) {
            1.0
        } else {
            -1.0
        };
        let sigma = &profile.deviations;
        let offset = profile.mode_offset * sign;

        match profile.motion {
            Motion::Diff(m) => {
                let rot1 = m.rot1 + offset.x + self.gaussian(sigma.x);
                let trans = m.trans + offset.y + self.gaussian(sigma.y);
                let rot2 = m.rot2 + offset.z + self.gaussian(sigma.z);
                DiffMotion::to_local(rot1, trans, rot2)
            }
            Motion::Omni(m) => {
                let trans = m.trans + offset.x + self.gaussian(sigma.x);
                let strafe = offset.y + self.gaussian(sigma.y);
                let rot = m.rot + offset.z + self.gaussian(sigma.z);
                m.to_local(trans, strafe, rot)
            }
        }
    }

    /// Zero-mean normal draw. Always consumes one variate so the stream stays
    /// aligned when a deviation is zero.
    fn gaussian(&mut self, sigma: f64) -> f64 {
        let z: f64 = self.rng.sample(StandardNormal);
        sigma * z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;

    fn reading(delta: Pose2D) -> OdometryReading {
        OdometryReading::new(Pose2D::identity(), delta, 0.1)
    }

    #[test]
    fn selector_routes_every_variant() {
        for variant in ModelVariant::ALL {
            let routine = MotionModelSelector::select(variant);
            assert_eq!(routine.variant, variant);
            assert_eq!(
                matches!(routine.mixing, Mixing::Diff(_)),
                variant.is_differential()
            );
            assert_eq!(routine.confidence_scaled, variant.uses_confidence());
            assert_eq!(routine.bimodal, variant.is_bimodal());
        }
    }

    #[test]
    fn multiplier_spans_one_to_max_scale() {
        assert_eq!(confidence_multiplier(5.0, 1.0), 1.0);
        assert_eq!(confidence_multiplier(5.0, 0.0), 5.0);
        assert_abs_diff_eq!(confidence_multiplier(5.0, 0.5), 3.0);
        assert_eq!(confidence_multiplier(5.0, 2.0), 1.0);
        assert_eq!(confidence_multiplier(5.0, f64::NAN), 5.0);
    }

    #[test]
    fn floor_scales_with_elapsed_time() {
        let params = NoiseParameterSet::new([0.1, 0.1, 0.1, 0.1, 0.1, 0.0]).with_noise_floor_scale(0.5);
        let routine = MotionModelSelector::select(ModelVariant::OmniCorrected);
        let mut r = reading(Pose2D::identity());
        let at_expected = NoiseProfile::new(&routine, &params, &r);
        r.time_elapsed = 0.4;
        let four_times = NoiseProfile::new(&routine, &params, &r);
        for i in 0..3 {
            assert_abs_diff_eq!(four_times.floor[i], 2.0 * at_expected.floor[i], epsilon = 1e-12);
        }
        assert_abs_diff_eq!(at_expected.floor.x, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn floor_survives_zero_alphas() {
        let r = reading(Pose2D::identity());
        for (alphas, variant) in [
            ([0.0; 6], ModelVariant::Diff),
            ([0.2, 0.2, 0.0, 0.0, 0.0, 0.0], ModelVariant::Diff),
            ([0.0; 6], ModelVariant::OmniRosie),
        ] {
            let params = NoiseParameterSet::new(alphas);
            let routine = MotionModelSelector::select(variant);
            let profile = NoiseProfile::new(&routine, &params, &r);
            assert_eq!(profile.floor, Vector3::repeat(0.1), "{variant}");
            assert_eq!(profile.deviations, profile.floor, "{variant}");
        }
    }

    #[test]
    fn large_unit_noise_raises_the_floor() {
        let params = NoiseParameterSet::new([2.0, 2.0, 2.0, 2.0, 2.0, 0.0]).with_noise_floor_scale(0.1);
        let routine = MotionModelSelector::select(ModelVariant::OmniCorrected);
        let profile = NoiseProfile::new(&routine, &params, &reading(Pose2D::identity()));
        assert_abs_diff_eq!(profile.floor.x, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn bimodal_mode_draw_is_taken_even_without_offset() {
        let params = NoiseParameterSet::new([0.1; 6]).with_peak_mode_delta_pct(0.0);
        let delta = Pose2D::new(0.3, 0.0, 0.2);
        let bimodal = NoiseProfile::new(
            &MotionModelSelector::select(ModelVariant::OmniBimodal),
            &params,
            &reading(delta),
        );
        assert!(bimodal.bimodal);
        assert_eq!(bimodal.mode_offset, Vector3::zeros());

        // One mode bit and three normals per draw, whatever the offset.
        let mut sampler = Sampler::new(ChaCha8Rng::seed_from_u64(3));
        sampler.sample(&bimodal);
        let mut expected = ChaCha8Rng::seed_from_u64(3);
        expected.gen_bool(0.5);
        for _ in 0..3 {
            let _: f64 = expected.sample(StandardNormal);
        }
        let after = sampler.replace_rng(ChaCha8Rng::seed_from_u64(0));
        assert_eq!(after, expected);
    }

    #[test]
    fn floor_only_binds_for_small_motion() {
        let params = NoiseParameterSet::new([0.1, 0.1, 0.1, 0.1, 0.1, 0.0]);
        let routine = MotionModelSelector::select(ModelVariant::OmniCorrected);
        let profile = NoiseProfile::new(&routine, &params, &reading(Pose2D::new(2.0, 0.0, 1.0)));
        assert!(profile.deviations.x > profile.floor.x);
        let expected = (0.1 * 4.0 + 0.1_f64).sqrt();
        assert_abs_diff_eq!(profile.deviations.x, expected, epsilon = 1e-12);
    }

    #[test]
    fn bimodal_offsets_follow_motion_magnitude() {
        let params = NoiseParameterSet::new([0.0; 6]).with_peak_mode_delta_pct(0.25);
        let routine = MotionModelSelector::select(ModelVariant::OmniBimodal);
        let profile = NoiseProfile::new(&routine, &params, &reading(Pose2D::new(0.0, -2.0, -0.8)));
        assert_abs_diff_eq!(profile.mode_offset.x, 0.5, epsilon = 1e-12);
        assert_eq!(profile.mode_offset.y, 0.0);
        assert_abs_diff_eq!(profile.mode_offset.z, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn zero_deviation_sampling_returns_nominal_motion() {
        let params = NoiseParameterSet::new([0.0; 6]).with_noise_floor_scale(0.0);
        let delta = Pose2D::new(0.4, 0.3, 0.2);
        let mut sampler = Sampler::new(ChaCha8Rng::seed_from_u64(7));
        for variant in [ModelVariant::DiffCorrected, ModelVariant::OmniRosie] {
            let routine = MotionModelSelector::select(variant);
            let profile = NoiseProfile::new(&routine, &params, &reading(delta));
            let local = sampler.sample(&profile);
            assert_abs_diff_eq!(local.x, delta.x, epsilon = 1e-12);
            assert_abs_diff_eq!(local.y, delta.y, epsilon = 1e-12);
            assert_abs_diff_eq!(local.theta, delta.theta, epsilon = 1e-12);
        }
    }
}
