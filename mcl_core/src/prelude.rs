// mcl_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::messages::{OdometryReading, SensorData};
pub use crate::models::SensorModel;
pub use crate::particles::ParticleSet;
pub use crate::registry::SensorRegistry;
pub use crate::types::SensorHandle;

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::error::ConfigurationError;
pub use crate::particles::{Particle, PoseStatistics, SampleSet};
pub use crate::types::Pose2D;

// --- Concrete Model Implementations ---
pub use crate::models::odometry::{
    ModelVariant, NoiseParameterSet, NoiseProfile, OdometryConfig, OdometryModel,
};
