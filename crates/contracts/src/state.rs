//! StateEstimate - Frontend output
//!
//! Immutable snapshot of the estimator state after one processed message.

use crate::{Quaternion, Vector3};

/// Estimator state snapshot
///
/// Copied into output rows; never mutated after production.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateEstimate {
    /// Estimate timestamp (sim time, seconds)
    pub t: f64,

    /// Position (m)
    pub position: Vector3,

    /// Orientation
    pub orientation: Quaternion,

    /// Accelerometer bias (m/s²)
    pub accel_bias: Vector3,

    /// Gyroscope bias (rad/s)
    pub gyro_bias: Vector3,
}
