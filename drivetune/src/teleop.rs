//! Debug teleop loop.
//!
//! Writes every tunable of [`TeleopConfig`] to the mechanisms once per tick and
//! streams the bucket and lift readings. New tunables take effect only through
//! [`TeleopLoop::update_config`].

use drivetune_common::config::{ConfigError, TeleopConfig};
use drivetune_common::mechanisms::{Mechanisms, MotorId};
use drivetune_common::telemetry::TelemetrySink;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct TeleopLoop {
    config: TeleopConfig,
    ticks: u64,
}

impl TeleopLoop {
    /// # Errors
    /// `ConfigError::ValidationError` if a speed is outside [-1, 1] or the
    /// bucket position outside [0, 1].
    pub fn new(config: TeleopConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!("Debug teleop loop ready: {:?}", config);
        Ok(Self { config, ticks: 0 })
    }

    pub fn config(&self) -> &TeleopConfig {
        &self.config
    }

    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Replace the tunables. An invalid config is rejected and the old one kept.
    pub fn update_config(&mut self, config: TeleopConfig) -> Result<(), ConfigError> {
        config.validate()?;
        if config != self.config {
            debug!("Teleop tunables updated: {:?}", config);
            self.config = config;
        }
        Ok(())
    }

    /// Write all outputs and publish one telemetry frame.
    pub fn tick<M, T>(&mut self, mechanisms: &mut M, telemetry: &mut T)
    where
        M: Mechanisms + ?Sized,
        T: TelemetrySink + ?Sized,
    {
        let c = &self.config;
        mechanisms.set_motor_power(MotorId::Intake, c.intake_speed);
        mechanisms.set_motor_power(MotorId::Conveyor, c.conveyor_speed);
        mechanisms.set_motor_power(MotorId::Spinner, c.spinner_speed);
        mechanisms.set_lift_coefficients(c.lift_coefficients);
        mechanisms.set_lift_target(c.lift_position);
        mechanisms.set_lift_power(c.lift_speed);
        mechanisms.set_bucket_position(c.bucket_position);
        mechanisms.set_motor_power(MotorId::Drive, c.drive_speed);

        telemetry.clear();
        telemetry.add_data("bucket position", &mechanisms.bucket_position());
        telemetry.add_data("lift position", &mechanisms.lift_position());
        telemetry.update();

        self.ticks += 1;
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
