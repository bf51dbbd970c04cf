//! drivetune Common Library
//!
//! Shared types, hardware-facing traits and configuration for every crate of
//! the drivetune workspace.
//!
//! # Module Structure
//!
//! - [`config`] - TOML configuration loading and validation
//! - [`drive`] - Drive handle trait and drivetrain constants
//! - [`mechanisms`] - Teleop mechanism trait
//! - [`series`] - Sample series and fitted feedforward results
//! - [`signals`] - Operator / host signal levels
//! - [`telemetry`] - Telemetry sinks
//! - [`prelude`] - Common re-exports for convenience

pub mod config;
pub mod drive;
pub mod mechanisms;
pub mod prelude;
pub mod series;
pub mod signals;
pub mod telemetry;
