// mcl_core/src/registry.rs

use std::collections::HashMap;

use crate::messages::SensorData;
use crate::models::SensorModel;
use crate::particles::ParticleSet;
use crate::types::SensorHandle;

/// The set of sensor models driving one particle filter, keyed by the handle
/// of the sensor that feeds each of them.
#[derive(Debug, Clone, Default)]
pub struct SensorRegistry {
    models: HashMap<SensorHandle, Box<dyn SensorModel>>,
}

impl SensorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `model` under `handle`, returning any model it replaces.
    pub fn register(
        &mut self,
        handle: SensorHandle,
        model: Box<dyn SensorModel>,
    ) -> Option<Box<dyn SensorModel>> {
        self.models.insert(handle, model)
    }

    pub fn remove(&mut self, handle: SensorHandle) -> Option<Box<dyn SensorModel>> {
        self.models.remove(&handle)
    }

    pub fn get(&self, handle: SensorHandle) -> Option<&dyn SensorModel> {
        self.models.get(&handle).map(|m| m.as_ref())
    }

    pub fn get_mut(&mut self, handle: SensorHandle) -> Option<&mut Box<dyn SensorModel>> {
        self.models.get_mut(&handle)
    }

    /// Looks up a model and downcasts it to its concrete type.
    pub fn get_as<T: SensorModel + 'static>(&self, handle: SensorHandle) -> Option<&T> {
        self.models.get(&handle)?.as_any().downcast_ref::<T>()
    }

    pub fn get_as_mut<T: SensorModel + 'static>(&mut self, handle: SensorHandle) -> Option<&mut T> {
        self.models.get_mut(&handle)?.as_any_mut().downcast_mut::<T>()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Handles of the registered action (motion) models.
    pub fn action_handles(&self) -> impl Iterator<Item = SensorHandle> + '_ {
        self.models
            .iter()
            .filter(|(_, m)| m.is_action())
            .map(|(handle, _)| *handle)
    }

    /// Routes a motion update to the model registered under `handle`.
    /// Unknown handles and observation-only models report `false`.
    pub fn apply_action(
        &mut self,
        handle: SensorHandle,
        particles: &mut dyn ParticleSet,
        data: &mut SensorData,
    ) -> bool {
        match self.models.get_mut(&handle) {
            Some(model) if model.is_action() => model.update_action(particles, data),
            // We don't have an action model for this sensor, so we ignore its data.
            _ => false,
        }
    }

    /// Routes an observation update to the model registered under `handle`.
    pub fn apply_sensor(
        &mut self,
        handle: SensorHandle,
        particles: &mut dyn ParticleSet,
        data: &SensorData,
    ) -> bool {
        match self.models.get_mut(&handle) {
            Some(model) if !model.is_action() => model.update_sensor(particles, data),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::OdometryReading;
    use crate::models::odometry::{ModelVariant, NoiseParameterSet, OdometryConfig, OdometryModel};
    use crate::particles::SampleSet;
    use crate::types::Pose2D;

    const WHEELS: SensorHandle = SensorHandle(1);

    fn registry() -> SensorRegistry {
        let config = OdometryConfig::new(
            ModelVariant::DiffCorrected,
            NoiseParameterSet::new([0.01; 6]).with_noise_floor_scale(0.01),
        );
        let mut registry = SensorRegistry::new();
        registry.register(WHEELS, Box::new(OdometryModel::from_seed(config, 3).unwrap()));
        registry
    }

    fn data() -> SensorData {
        OdometryReading::new(Pose2D::identity(), Pose2D::new(0.2, 0.0, 0.0), 0.1).into()
    }

    #[test]
    fn routes_actions_to_registered_model() {
        let mut registry = registry();
        let mut set = SampleSet::new(4, Pose2D::identity());
        assert!(registry.apply_action(WHEELS, &mut set, &mut data()));
        assert!(set.poses().all(|p| p.x > 0.0));
    }

    #[test]
    fn unknown_handle_is_ignored() {
        let mut registry = registry();
        let mut set = SampleSet::new(4, Pose2D::identity());
        assert!(!registry.apply_action(SensorHandle(99), &mut set, &mut data()));
        assert!(set.poses().all(|p| *p == Pose2D::identity()));
    }

    #[test]
    fn action_models_do_not_take_observations() {
        let mut registry = registry();
        let mut set = SampleSet::new(4, Pose2D::identity());
        assert!(!registry.apply_sensor(WHEELS, &mut set, &data()));
    }

    #[test]
    fn downcast_gives_access_to_concrete_model() {
        let mut registry = registry();
        assert_eq!(registry.action_handles().collect::<Vec<_>>(), vec![WHEELS]);
        let odom = registry.get_as_mut::<OdometryModel>(WHEELS).unwrap();
        odom.configure_differential_drive(0.0, 0.0, 0.0, 0.0).unwrap();
        assert_eq!(
            registry.get_as::<OdometryModel>(WHEELS).unwrap().variant(),
            ModelVariant::Diff
        );
    }

    #[test]
    fn cloned_registry_is_independent() {
        let registry = registry();
        let mut copy = registry.clone();
        copy.remove(WHEELS);
        assert!(copy.is_empty());
        assert_eq!(registry.len(), 1);
    }
}
