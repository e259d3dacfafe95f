// mcl_core/src/messages.rs

use crate::types::Pose2D;

// =========================================================================
// == Odometry ==
// =========================================================================

/// One relative-motion observation from the odometry source.
#[derive(Debug, Clone, PartialEq)]
pub struct OdometryReading {
    /// Absolute odometric pose. Carried for bookkeeping only; sampling never
    /// reads it.
    pub pose: Pose2D,
    /// Motion since the previous reading, expressed in the robot's frame at
    /// that previous reading.
    pub delta: Pose2D,
    /// Seconds since the previous reading.
    pub time_elapsed: f64,
    /// Quality of the current pose estimate in `[0, 1]`.
    pub confidence: f64,
    multiplier: f64,
}

impl OdometryReading {
    /// Creates a reading with full confidence.
    pub fn new(pose: Pose2D, delta: Pose2D, time_elapsed: f64) -> Self {
        Self {
            pose,
            delta,
            time_elapsed,
            confidence: 1.0,
            multiplier: 1.0,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// The noise multiplier derived during the last update this reading was
    /// used in. Always `1.0` for variants that ignore confidence.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub(crate) fn set_multiplier(&mut self, multiplier: f64) {
        self.multiplier = multiplier;
    }
}

// =========================================================================
// == Sensor Data Envelope ==
// =========================================================================

/// A self-describing container for the per-tick payload handed to a
/// `SensorModel`.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SensorData {
    Odometry(OdometryReading),
}

impl SensorData {
    pub fn as_odometry(&self) -> Option<&OdometryReading> {
        match self {
            SensorData::Odometry(reading) => Some(reading),
        }
    }

    pub fn as_odometry_mut(&mut self) -> Option<&mut OdometryReading> {
        match self {
            SensorData::Odometry(reading) => Some(reading),
        }
    }
}

impl From<OdometryReading> for SensorData {
    fn from(reading: OdometryReading) -> Self {
        SensorData::Odometry(reading)
    }
}
