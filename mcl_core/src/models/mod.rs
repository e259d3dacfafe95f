// mcl_core/src/models/mod.rs

use crate::messages::SensorData;
use crate::particles::ParticleSet;
use dyn_clone::DynClone;
use std::any::Any;
use std::fmt::Debug;

// --- SENSOR MODEL TRAIT ---
/// The capability set shared by every model the filter can be driven with.
///
/// Action models (odometry) move particles through `update_action`;
/// observation models reweight them through `update_sensor`. A model only
/// implements the half it supports; the other defaults to "not handled".
pub trait SensorModel: DynClone + Debug + Send + Sync {
    /// `true` if this model propagates particles rather than weighting them.
    fn is_action(&self) -> bool;

    /// Applies a motion update to every particle.
    /// Returns `true` if the particle set was changed.
    fn update_action(&mut self, particles: &mut dyn ParticleSet, data: &mut SensorData) -> bool {
        let _ = particles;
        let _ = data;
        false
    }

    /// Applies an observation update to the particle set.
    /// Returns `true` if the particle set was changed.
    fn update_sensor(&mut self, particles: &mut dyn ParticleSet, data: &SensorData) -> bool {
        let _ = particles;
        let _ = data;
        false
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

// This macro automatically generates the implementation of `Clone` for `Box<dyn SensorModel>`.
dyn_clone::clone_trait_object!(SensorModel);

pub mod odometry;
