//! Simulated tank drive.
//!
//! The plant is the feedforward model itself:
//!
//! ```text
//! power = kv·v + ka·a + k_static·sign(power)     for |power| > k_static
//! v → 0                                          for |power| <= k_static
//! ```
//!
//! Power inside the static dead band does not move the robot: it settles at
//! rest instead of being driven backward. Outside the band the static term
//! opposes the commanded power. Each `update_position_estimate` advances the
//! plant by one fixed tick with the power held constant over the tick, using
//! the closed-form first-order response when `ka > 0`.

use drivetune_common::config::PlantConfig;
use drivetune_common::drive::{DriveConstraints, DriveHandle};
use tracing::trace;

/// Simulated drivetrain along its forward axis.
#[derive(Debug, Clone)]
pub struct SimDrive {
    plant: PlantConfig,
    /// Rated top velocity reported to the tuner.
    rated_velocity: f64,
    /// Fixed tick period [s].
    dt: f64,
    /// Commanded power held until the next command.
    power: f64,
    /// True position since the last reset.
    position: f64,
    velocity: f64,
    /// Every power command, oldest first.
    power_log: Vec<f64>,
    /// Number of plant steps taken.
    steps: u64,
}

impl SimDrive {
    /// Create a drive at rest at position zero.
    pub fn new(constraints: &DriveConstraints, plant: PlantConfig, dt: f64) -> Self {
        Self::with_rated_velocity(constraints.max_rated_velocity(), plant, dt)
    }

    /// Create a drive reporting an explicit rated velocity.
    pub fn with_rated_velocity(rated_velocity: f64, plant: PlantConfig, dt: f64) -> Self {
        Self {
            plant,
            rated_velocity,
            dt,
            power: 0.0,
            position: 0.0,
            velocity: 0.0,
            power_log: Vec::new(),
            steps: 0,
        }
    }

    /// Current plant velocity.
    #[inline]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Power currently applied.
    #[inline]
    pub fn commanded_power(&self) -> f64 {
        self.power
    }

    /// Last power command, if any was issued.
    #[inline]
    pub fn last_commanded_power(&self) -> Option<f64> {
        self.power_log.last().copied()
    }

    /// Every power command issued so far.
    pub fn power_log(&self) -> &[f64] {
        &self.power_log
    }

    /// Number of ticks simulated.
    #[inline]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Put the robot back down at rest, as an operator does between tests.
    /// The held power is unchanged.
    pub fn place_at_rest(&mut self) {
        self.velocity = 0.0;
        self.position = 0.0;
    }

    /// Velocity the plant settles at for `power`.
    fn terminal_velocity(&self, power: f64) -> f64 {
        if power.abs() <= self.plant.k_static {
            return 0.0;
        }
        (power - self.plant.k_static * power.signum()) / self.plant.kv
    }

    /// Advance the plant by one tick with the held power.
    fn step(&mut self) {
        let v_inf = self.terminal_velocity(self.power);

        if self.plant.ka > 0.0 {
            let tau = self.plant.ka / self.plant.kv;
            let decay = (-self.dt / tau).exp();
            let v0 = self.velocity;
            self.position += v_inf * self.dt + (v0 - v_inf) * tau * (1.0 - decay);
            self.velocity = v_inf + (v0 - v_inf) * decay;
        } else {
            self.position += v_inf * self.dt;
            self.velocity = v_inf;
        }

        self.steps += 1;
        trace!(
            "SimDrive step {}: power={:.4}, pos={:.4}, vel={:.4}",
            self.steps, self.power, self.position, self.velocity
        );
    }
}

impl DriveHandle for SimDrive {
    fn set_axis_power(&mut self, power: f64) {
        self.power = power;
        self.power_log.push(power);
    }

    fn position_estimate(&self) -> f64 {
        self.position
    }

    fn update_position_estimate(&mut self) {
        self.step();
    }

    fn max_rated_velocity(&self) -> f64 {
        self.rated_velocity
    }

    fn reset_position_estimate(&mut self) {
        self.position = 0.0;
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
