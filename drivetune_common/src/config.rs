//! Configuration loading traits and types.
//!
//! Every tunable the robot code used to read from mutable static fields lives
//! here as an explicit, validated structure loaded from `drivetune.toml`.
//!
//! # Usage
//!
//! ```rust,no_run
//! use drivetune_common::config::{ConfigError, DrivetuneConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = DrivetuneConfig::load_validated(Path::new("drivetune.toml"))?;
//!     println!("max power: {}", config.tuning.max_power);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::drive::DriveConstraints;
use crate::mechanisms::PidCoefficients;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Common fields shared by every drivetune binary.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "drivetune-practice-bot"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Instance identifier shown in logs.
    pub service_name: String,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            service_name: "drivetune".to_string(),
        }
    }
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parameters of the feedforward identification routine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TuningConfig {
    /// Peak commanded power of both drive tests, in (0, 1].
    pub max_power: f64,
    /// Travel distance each test is sized for [in].
    pub distance: f64,
    /// Control loop tick period used by the CLI scheduler [s].
    pub tick_period_s: f64,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            max_power: 0.7,
            distance: 100.0,
            tick_period_s: 0.02,
        }
    }
}

impl TuningConfig {
    /// Reject inputs that would produce non-finite or infinite test durations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.max_power.is_finite() || self.max_power <= 0.0 || self.max_power > 1.0 {
            return Err(ConfigError::ValidationError(format!(
                "tuning.max_power must be in (0, 1], got {}",
                self.max_power
            )));
        }
        if !self.distance.is_finite() || self.distance <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "tuning.distance must be > 0, got {}",
                self.distance
            )));
        }
        if !self.tick_period_s.is_finite() || self.tick_period_s <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "tuning.tick_period_s must be > 0, got {}",
                self.tick_period_s
            )));
        }
        Ok(())
    }
}

/// Feedforward model of the simulated drive plant.
///
/// `power = kv·v + ka·a + k_static`, see `drivetune_sim::SimDrive`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlantConfig {
    /// Power per unit velocity.
    pub kv: f64,
    /// Constant power offset.
    pub k_static: f64,
    /// Power per unit acceleration (0 = velocity follows power instantly).
    pub ka: f64,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            kv: 0.016,
            k_static: 0.05,
            ka: 0.002,
        }
    }
}

impl PlantConfig {
    /// Validate plant coefficients.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.kv.is_finite() || self.kv <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "sim.kv must be > 0, got {}",
                self.kv
            )));
        }
        if !self.k_static.is_finite() || self.k_static < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "sim.k_static must be >= 0, got {}",
                self.k_static
            )));
        }
        if !self.ka.is_finite() || self.ka < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "sim.ka must be >= 0, got {}",
                self.ka
            )));
        }
        Ok(())
    }
}

/// Tunables of the debug teleop loop.
///
/// Refreshed explicitly through `TeleopLoop::update_config` instead of being
/// read from global state every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TeleopConfig {
    pub intake_speed: f64,
    pub conveyor_speed: f64,
    pub spinner_speed: f64,
    /// Lift target [encoder ticks].
    pub lift_position: i32,
    /// Lift power limit while tracking the target.
    pub lift_speed: f64,
    pub lift_coefficients: PidCoefficients,
    /// Bucket servo position in [0, 1].
    pub bucket_position: f64,
    pub drive_speed: f64,
}

impl Default for TeleopConfig {
    fn default() -> Self {
        Self {
            intake_speed: 0.0,
            conveyor_speed: 0.0,
            spinner_speed: 0.0,
            lift_position: 0,
            lift_speed: 0.0,
            lift_coefficients: PidCoefficients::default(),
            bucket_position: 1.0,
            drive_speed: 0.0,
        }
    }
}

impl TeleopConfig {
    /// Validate power and servo ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let powers = [
            ("intake_speed", self.intake_speed),
            ("conveyor_speed", self.conveyor_speed),
            ("spinner_speed", self.spinner_speed),
            ("lift_speed", self.lift_speed),
            ("drive_speed", self.drive_speed),
        ];
        for (name, value) in powers {
            if !value.is_finite() || !(-1.0..=1.0).contains(&value) {
                return Err(ConfigError::ValidationError(format!(
                    "teleop.{name} must be in [-1, 1], got {value}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.bucket_position) {
            return Err(ConfigError::ValidationError(format!(
                "teleop.bucket_position must be in [0, 1], got {}",
                self.bucket_position
            )));
        }
        Ok(())
    }
}

/// Root of `drivetune.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DrivetuneConfig {
    #[serde(default)]
    pub shared: SharedConfig,
    #[serde(default)]
    pub tuning: TuningConfig,
    #[serde(default)]
    pub drive: DriveConstraints,
    #[serde(default)]
    pub sim: PlantConfig,
    #[serde(default)]
    pub teleop: TeleopConfig,
}

impl DrivetuneConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.tuning.validate()?;
        self.drive.validate()?;
        self.sim.validate()?;
        self.teleop.validate()?;
        Ok(())
    }

    /// Load `path` and validate it.
    pub fn load_validated(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML document held in memory.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation: any serde-deserializable struct can be loaded.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_log_level_default() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn test_log_level_serialization() {
        #[derive(Serialize)]
        struct TestWrapper {
            level: LogLevel,
        }

        let wrapper = TestWrapper {
            level: LogLevel::Warn,
        };
        assert!(toml::to_string(&wrapper).unwrap().contains("warn"));
        assert_eq!(LogLevel::Trace.as_directive(), "trace");
    }

    #[test]
    fn test_tuning_defaults_match_routine_tunables() {
        let t = TuningConfig::default();
        assert_eq!(t.max_power, 0.7);
        assert_eq!(t.distance, 100.0);
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_tuning_rejects_degenerate_inputs() {
        let zero_distance = TuningConfig {
            distance: 0.0,
            ..Default::default()
        };
        assert!(zero_distance.validate().is_err());

        let negative_power = TuningConfig {
            max_power: -0.2,
            ..Default::default()
        };
        assert!(negative_power.validate().is_err());

        let too_much_power = TuningConfig {
            max_power: 1.5,
            ..Default::default()
        };
        assert!(too_much_power.validate().is_err());

        let nan_distance = TuningConfig {
            distance: f64::NAN,
            ..Default::default()
        };
        assert!(nan_distance.validate().is_err());
    }

    #[test]
    fn test_teleop_rejects_out_of_range_speed() {
        let t = TeleopConfig {
            intake_speed: 1.2,
            ..Default::default()
        };
        let err = t.validate().unwrap_err();
        assert!(err.to_string().contains("intake_speed"));
    }

    #[test]
    fn test_shared_config_empty_name() {
        let s = SharedConfig {
            log_level: LogLevel::Info,
            service_name: String::new(),
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_load_partial_file_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[tuning]
max_power = 0.5
"#
        )
        .unwrap();

        let config = DrivetuneConfig::load_validated(file.path()).unwrap();
        assert_eq!(config.tuning.max_power, 0.5);
        assert_eq!(config.tuning.distance, 100.0);
        assert_eq!(config.shared.service_name, "drivetune");
    }

    #[test]
    fn test_load_missing_file() {
        let result = DrivetuneConfig::load(Path::new("/nonexistent/drivetune.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "this is not [valid toml").unwrap();
        let result = DrivetuneConfig::load(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
