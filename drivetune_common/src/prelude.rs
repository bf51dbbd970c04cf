//! Prelude module for common re-exports.
//!
//! ```rust
//! use drivetune_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{
    ConfigError, ConfigLoader, DrivetuneConfig, LogLevel, PlantConfig, SharedConfig,
    TeleopConfig, TuningConfig,
};

// ─── Hardware traits ────────────────────────────────────────────────
pub use crate::drive::{DriveConstraints, DriveHandle};
pub use crate::mechanisms::{Mechanisms, MotorId, PidCoefficients};

// ─── Samples & results ──────────────────────────────────────────────
pub use crate::series::{AccelResult, RampResult, SampleSeries};

// ─── Operator I/O ───────────────────────────────────────────────────
pub use crate::signals::{SignalSource, Signals};
pub use crate::telemetry::{BufferedTelemetry, TelemetrySink, TracingTelemetry};
