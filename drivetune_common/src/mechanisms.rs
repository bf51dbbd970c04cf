//! Mechanism outputs driven by the debug teleop loop.

use serde::{Deserialize, Serialize};

/// Open-loop motors written every teleop tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotorId {
    Intake,
    Conveyor,
    Spinner,
    /// All four drive motors as one group.
    Drive,
}

impl MotorId {
    pub const ALL: [MotorId; 4] = [
        MotorId::Intake,
        MotorId::Conveyor,
        MotorId::Spinner,
        MotorId::Drive,
    ];
}

/// Position-loop gains of the lift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PidCoefficients {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl Default for PidCoefficients {
    fn default() -> Self {
        Self {
            kp: 1.0,
            ki: 0.0,
            kd: 0.0,
        }
    }
}

/// Hardware behind the teleop loop, owned by the host runtime.
pub trait Mechanisms {
    /// Set open-loop power of a motor.
    fn set_motor_power(&mut self, motor: MotorId, power: f64);

    /// Update the lift's position-loop gains.
    fn set_lift_coefficients(&mut self, coefficients: PidCoefficients);

    /// Set the lift's position target [encoder ticks].
    fn set_lift_target(&mut self, position: i32);

    /// Set the lift's power limit while it tracks the target.
    fn set_lift_power(&mut self, power: f64);

    /// Command the bucket servo, in [0, 1].
    fn set_bucket_position(&mut self, position: f64);

    /// Last commanded bucket servo position.
    fn bucket_position(&self) -> f64;

    /// Lift encoder reading [ticks].
    fn lift_position(&self) -> i32;
}
