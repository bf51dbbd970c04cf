//! Drive handle trait and drive constraints.
//!
//! The tuner never talks to motors directly. It commands a single drive-axis
//! power and reads back a position estimate through [`DriveHandle`], which is
//! implemented by the robot runtime or by `drivetune_sim::SimDrive`.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Interface to the robot's drivetrain along its forward axis.
///
/// # Lifecycle per tuning phase
///
/// 1. `reset_position_estimate()` - zero the pose at phase start
/// 2. `set_axis_power()` / `position_estimate()` / `update_position_estimate()` - every tick
/// 3. `set_axis_power(0.0)` - on every exit path
///
/// The handle is used exclusively by one routine at a time; there is no
/// concurrent writer.
pub trait DriveHandle {
    /// Command a forward power, dimensionless in roughly [-1, 1].
    fn set_axis_power(&mut self, power: f64);

    /// Current position estimate along the drive axis.
    fn position_estimate(&self) -> f64;

    /// Advance the position estimate by one tick of odometry.
    fn update_position_estimate(&mut self);

    /// Rated top speed of the drivetrain at full power.
    fn max_rated_velocity(&self) -> f64;

    /// Reset the position estimate to zero.
    fn reset_position_estimate(&mut self);
}

/// Physical constants of the drivetrain.
///
/// # TOML Example
///
/// ```toml
/// [drive]
/// max_rpm = 312.0
/// gear_ratio = 1.0
/// wheel_radius = 1.89
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriveConstraints {
    /// Motor free speed [rev/min].
    pub max_rpm: f64,
    /// Output (wheel) revolutions per motor revolution.
    pub gear_ratio: f64,
    /// Wheel radius [in].
    pub wheel_radius: f64,
}

impl Default for DriveConstraints {
    fn default() -> Self {
        Self {
            max_rpm: 312.0,
            gear_ratio: 1.0,
            wheel_radius: 1.89,
        }
    }
}

impl DriveConstraints {
    /// Rated top velocity [in/s] = rpm · gear ratio · 2π · r / 60.
    #[inline]
    pub fn max_rated_velocity(&self) -> f64 {
        self.max_rpm * self.gear_ratio * 2.0 * std::f64::consts::PI * self.wheel_radius / 60.0
    }

    /// All three constants must be positive and finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("max_rpm", self.max_rpm),
            ("gear_ratio", self.gear_ratio),
            ("wheel_radius", self.wheel_radius),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "drive.{name} must be > 0, got {value}"
                )));
            }
        }
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
