//! Tuner error types.
//!
//! Degenerate inputs are rejected before a drive test starts; fit failures
//! are reported on telemetry and end the routine without coefficients.

use drivetune_common::config::ConfigError;
use thiserror::Error;

/// Errors that prevent a drive test from being planned.
#[derive(Debug, Clone, Error)]
pub enum TuningError {
    /// Distance / max power / tick period out of range.
    #[error("invalid tuning configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// The drive reported a rated velocity that gives no finite test duration.
    #[error("rated drive velocity must be positive and finite, got {0}")]
    InvalidRatedVelocity(f64),
}

/// Errors reported by the regression module instead of fabricated coefficients.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    /// Too few samples to differentiate and fit (e.g. stop before the first tick).
    #[error("not enough samples to fit: got {got}, need at least {needed}")]
    InsufficientSamples { got: usize, needed: usize },

    /// Input sequences differ in length.
    #[error("sample sequences differ in length: {times} times, {positions} positions, {powers} powers")]
    MismatchedLengths {
        times: usize,
        positions: usize,
        powers: usize,
    },

    /// Paired `x` / `y` slices differ in length.
    #[error("paired values differ in length: {x} x values, {y} y values")]
    MismatchedPairs { x: usize, y: usize },

    /// Zero spread in the regressor, repeated timestamps or non-finite values.
    #[error("degenerate samples: {0}")]
    DegenerateInput(&'static str),
}
