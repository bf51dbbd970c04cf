//! Drive-test samplers.
//!
//! Each sampler is ticked once per control cycle with the current time and
//! appends one `(elapsed, position, power)` triple per tick. Both commands zero
//! power on every exit path: timeout inside `tick`, or `halt` on cancellation.

pub mod constant;
pub mod ramp;

pub use constant::ConstantPowerSampler;
pub use ramp::RampSampler;

/// Outcome of one sampler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerStatus {
    /// Sample recorded, test continues.
    Running,
    /// Test duration elapsed (or sampler halted); drive commanded to zero.
    Complete,
}

/// Elapsed time accepted as a new sample: non-negative and strictly after the previous one.
#[inline]
fn is_new_sample_time(elapsed: f64, last: Option<f64>) -> bool {
    elapsed >= 0.0 && last.is_none_or(|t| elapsed > t)
}
