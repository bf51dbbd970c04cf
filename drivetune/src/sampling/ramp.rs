//! Quasi-static ramp sampler.
//!
//! Power rises linearly from 0 to `max_power` over `ramp_time`. Per tick:
//! record `(elapsed, position, power)`, command the power, advance odometry.

use drivetune_common::drive::DriveHandle;
use drivetune_common::series::SampleSeries;
use tracing::{debug, trace};

use super::{SamplerStatus, is_new_sample_time};
use crate::profile::RampPlan;

/// Ramp-phase sampler.
#[derive(Debug, Clone)]
pub struct RampSampler {
    plan: RampPlan,
    start_time: f64,
    series: SampleSeries,
    finished: bool,
}

impl RampSampler {
    /// Zero the drive's position estimate and start the ramp clock at `now`.
    pub fn start<D: DriveHandle + ?Sized>(plan: RampPlan, drive: &mut D, now: f64) -> Self {
        drive.reset_position_estimate();
        debug!(
            "Ramp phase started: ramp_time={:.3}s, accel={:.5}, max_vel={:.3}",
            plan.ramp_time, plan.accel, plan.max_vel
        );
        Self {
            plan,
            start_time: now,
            series: SampleSeries::new(),
            finished: false,
        }
    }

    /// Run one control tick at time `now`.
    pub fn tick<D: DriveHandle + ?Sized>(&mut self, drive: &mut D, now: f64) -> SamplerStatus {
        if self.finished {
            return SamplerStatus::Complete;
        }

        let elapsed = now - self.start_time;
        if elapsed > self.plan.ramp_time {
            debug!(
                "Ramp phase timed out after {} samples ({:.3}s)",
                self.series.len(),
                elapsed
            );
            self.halt(drive);
            return SamplerStatus::Complete;
        }

        let power = self.plan.ramp_power(elapsed);
        if is_new_sample_time(elapsed, self.series.last_time()) {
            let position = drive.position_estimate();
            self.series.push(elapsed, position, power);
            trace!("ramp t={:.3} pos={:.4} power={:.4}", elapsed, position, power);
        }

        drive.set_axis_power(power);
        drive.update_position_estimate();
        SamplerStatus::Running
    }

    /// Command zero power and stop sampling. Idempotent.
    pub fn halt<D: DriveHandle + ?Sized>(&mut self, drive: &mut D) {
        drive.set_axis_power(0.0);
        self.finished = true;
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn series(&self) -> &SampleSeries {
        &self.series
    }

    pub fn into_series(self) -> SampleSeries {
        self.series
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
