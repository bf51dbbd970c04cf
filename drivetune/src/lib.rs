//! # drivetune
//!
//! Feedforward identification for a tank drive: a quasi-static ramp test and
//! an optional constant-power test, each fitted by least squares to recover
//! kV, kStatic and kA. Also hosts the debug teleop loop.
//!
//! ## Procedure
//!
//! 1. **Ramp**: power rises linearly over `ramp_time`; power is regressed on
//!    velocity for kV (and kStatic when the intercept is fitted).
//! 2. **Constant power**: `max_power` is held for `max_power_time`; the power
//!    left after the ramp model is regressed on acceleration for kA.
//!
//! Each test waits behind an operator confirmation ([`gate`]). Everything runs
//! in one cooperative loop: the host calls [`TuningSession::tick`] at a fixed
//! period with the current time and signal levels.
//!
//! ## Module Structure
//!
//! - [`profile`] - ramp plan (durations, slopes)
//! - [`sampling`] - ramp and constant-power samplers
//! - [`regression`] - numerical differentiation and the two fits
//! - [`gate`] - phase transitions and button debouncing
//! - [`session`] - the routine tying it all together
//! - [`operator`] - scripted signal sources
//! - [`scheduler`] - fixed-period tick clock
//! - [`teleop`] - debug teleop loop

pub mod error;
pub mod gate;
pub mod operator;
pub mod profile;
pub mod regression;
pub mod sampling;
pub mod scheduler;
pub mod session;
pub mod teleop;

pub use error::{FitError, TuningError};
pub use session::{TuningReport, TuningSession};
pub use teleop::TeleopLoop;
