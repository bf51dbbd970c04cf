//! Closed-form timing of the two drive tests.
//!
//! ```text
//! max_vel   = rated_velocity · max_power
//! final_vel = max_power · max_vel
//! accel     = final_vel² / (2 · distance)
//! ramp_time = sqrt(2 · distance / accel)       (= 2 · distance / final_vel)
//! power(t)  = accel · t / max_vel              (reaches max_power at ramp_time)
//! max_power_time = distance / max_vel
//! ```
//!
//! Integrating `power(t) · max_vel` over `[0, ramp_time]` gives back `distance`.

use drivetune_common::config::TuningConfig;
use serde::Serialize;

use crate::error::TuningError;

/// Durations and slopes of one tuning session, computed once before sampling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RampPlan {
    /// Peak commanded power.
    pub max_power: f64,
    /// Travel distance the tests are sized for.
    pub distance: f64,
    /// Estimated top velocity at `max_power`.
    pub max_vel: f64,
    /// Velocity reached at the end of the ramp.
    pub final_vel: f64,
    /// Constant acceleration of the velocity ramp.
    pub accel: f64,
    /// Duration of the ramp phase [s].
    pub ramp_time: f64,
    /// Duration of the constant-power phase [s].
    pub max_power_time: f64,
}

impl RampPlan {
    /// Plan both tests for `config` on a drive rated at `rated_velocity`.
    ///
    /// # Errors
    /// - `TuningError::InvalidConfig` for distance ≤ 0 or max power outside (0, 1]
    /// - `TuningError::InvalidRatedVelocity` for a rated velocity ≤ 0 or non-finite
    pub fn new(config: &TuningConfig, rated_velocity: f64) -> Result<Self, TuningError> {
        config.validate()?;
        if !rated_velocity.is_finite() || rated_velocity <= 0.0 {
            return Err(TuningError::InvalidRatedVelocity(rated_velocity));
        }

        let max_power = config.max_power;
        let distance = config.distance;
        let max_vel = rated_velocity * max_power;
        let final_vel = max_power * max_vel;
        let accel = (final_vel * final_vel) / (2.0 * distance);
        let ramp_time = (2.0 * distance / accel).sqrt();
        let max_power_time = distance / max_vel;

        Ok(Self {
            max_power,
            distance,
            max_vel,
            final_vel,
            accel,
            ramp_time,
            max_power_time,
        })
    }

    /// Ramp power commanded `elapsed` seconds into the ramp phase.
    #[inline]
    pub fn ramp_power(&self, elapsed: f64) -> f64 {
        self.accel * elapsed / self.max_vel
    }

    /// Distance covered by the ideal velocity ramp after `elapsed` seconds.
    #[inline]
    pub fn ramp_displacement(&self, elapsed: f64) -> f64 {
        0.5 * self.accel * elapsed * elapsed
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
