//! Simulated intake / conveyor / spinner / lift / bucket / drive mechanisms.
//!
//! Open-loop motors just hold their power. The lift runs a position PID toward
//! its target, saturated at the lift power limit, and moves at
//! `power · LIFT_TICKS_PER_SECOND` per second.

use std::collections::HashMap;

use drivetune_common::mechanisms::{Mechanisms, MotorId, PidCoefficients};
use tracing::{debug, trace};

use crate::pid::{PidState, pid_compute};

/// Lift encoder resolution [ticks/rev].
pub const LIFT_TICKS_PER_REV: f64 = 537.7;
/// Lift motor free speed [rev/min].
pub const LIFT_MAX_RPM: f64 = 312.0;
/// Lift encoder speed at full power [ticks/s].
pub const LIFT_TICKS_PER_SECOND: f64 = LIFT_TICKS_PER_REV * LIFT_MAX_RPM / 60.0;

/// In-memory mechanism set.
#[derive(Debug, Clone, Default)]
pub struct SimMechanisms {
    motors: HashMap<MotorId, f64>,
    lift_coefficients: PidCoefficients,
    lift_pid: PidState,
    lift_target: i32,
    lift_power_limit: f64,
    /// Continuous lift position [ticks]; the encoder reports it truncated.
    lift_position: f64,
    bucket_position: f64,
}

impl SimMechanisms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last power written to `motor` (0 if never written).
    pub fn motor_power(&self, motor: MotorId) -> f64 {
        self.motors.get(&motor).copied().unwrap_or(0.0)
    }

    /// Current lift target [ticks].
    pub fn lift_target(&self) -> i32 {
        self.lift_target
    }

    /// Advance the lift by `dt` seconds.
    pub fn step(&mut self, dt: f64) {
        let error = f64::from(self.lift_target) - self.lift_position;
        let raw = pid_compute(&mut self.lift_pid, &self.lift_coefficients, error, dt);
        let limit = self.lift_power_limit.abs();
        let power = raw.clamp(-limit, limit);
        self.lift_position += power * LIFT_TICKS_PER_SECOND * dt;
        trace!(
            "SimMechanisms lift: target={}, pos={:.1}, power={:.3}",
            self.lift_target, self.lift_position, power
        );
    }
}

impl Mechanisms for SimMechanisms {
    fn set_motor_power(&mut self, motor: MotorId, power: f64) {
        self.motors.insert(motor, power);
    }

    fn set_lift_coefficients(&mut self, coefficients: PidCoefficients) {
        if coefficients != self.lift_coefficients {
            debug!("Lift gains changed to {:?}", coefficients);
            self.lift_coefficients = coefficients;
            self.lift_pid.reset();
        }
    }

    fn set_lift_target(&mut self, position: i32) {
        self.lift_target = position;
    }

    fn set_lift_power(&mut self, power: f64) {
        self.lift_power_limit = power;
    }

    fn set_bucket_position(&mut self, position: f64) {
        self.bucket_position = position.clamp(0.0, 1.0);
    }

    fn bucket_position(&self) -> f64 {
        self.bucket_position
    }

    fn lift_position(&self) -> i32 {
        self.lift_position as i32
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motors_hold_power() {
        let mut m = SimMechanisms::new();
        m.set_motor_power(MotorId::Intake, 0.8);
        assert_eq!(m.motor_power(MotorId::Intake), 0.8);
        assert_eq!(m.motor_power(MotorId::Spinner), 0.0);
    }

    #[test]
    fn lift_does_not_move_without_power_limit() {
        let mut m = SimMechanisms::new();
        m.set_lift_coefficients(PidCoefficients::default());
        m.set_lift_target(500);
        for _ in 0..50 {
            m.step(0.02);
        }
        assert_eq!(m.lift_position(), 0);
    }

    #[test]
    fn lift_converges_on_target() {
        let mut m = SimMechanisms::new();
        m.set_lift_coefficients(PidCoefficients {
            kp: 0.01,
            ki: 0.0,
            kd: 0.0,
        });
        m.set_lift_target(400);
        m.set_lift_power(1.0);
        for _ in 0..500 {
            m.step(0.01);
        }
        assert!((m.lift_position() - 400).abs() <= 1, "lift at {}", m.lift_position());
    }

    #[test]
    fn bucket_is_clamped() {
        let mut m = SimMechanisms::new();
        m.set_bucket_position(1.4);
        assert_eq!(m.bucket_position(), 1.0);
    }
}
