//! Constant-power sampler.
//!
//! `max_power` is commanded once at start and held; each tick only records a
//! sample and advances odometry until `max_power_time` has elapsed.

use drivetune_common::drive::DriveHandle;
use drivetune_common::series::SampleSeries;
use tracing::{debug, trace};

use super::{SamplerStatus, is_new_sample_time};
use crate::profile::RampPlan;

/// Constant-power-phase sampler.
#[derive(Debug, Clone)]
pub struct ConstantPowerSampler {
    power: f64,
    duration: f64,
    start_time: f64,
    series: SampleSeries,
    finished: bool,
}

impl ConstantPowerSampler {
    /// Zero the position estimate, command `max_power` and start the clock at `now`.
    pub fn start<D: DriveHandle + ?Sized>(plan: &RampPlan, drive: &mut D, now: f64) -> Self {
        drive.reset_position_estimate();
        drive.set_axis_power(plan.max_power);
        debug!(
            "Constant-power phase started: power={:.3}, duration={:.3}s",
            plan.max_power, plan.max_power_time
        );
        Self {
            power: plan.max_power,
            duration: plan.max_power_time,
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
        if elapsed > self.duration {
            debug!(
                "Constant-power phase timed out after {} samples",
                self.series.len()
            );
            self.halt(drive);
            return SamplerStatus::Complete;
        }

        if is_new_sample_time(elapsed, self.series.last_time()) {
            let position = drive.position_estimate();
            self.series.push(elapsed, position, self.power);
            trace!("constant t={:.3} pos={:.4}", elapsed, position);
        }

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
