//! Feedforward tuning session.
//!
//! One [`TuningSession`] runs the whole routine: it is ticked once per control
//! cycle with the current time, the raw operator signals, the drive and a
//! telemetry sink. Per tick:
//!
//! 1. stop check (halts any active test, commands zero power, goes `Idle`)
//! 2. debouncer
//! 3. sampler tick while a drive test is running
//! 4. otherwise the debounced event is applied to the gate
//!
//! Entering a phase runs its entry action: prompts, planning, the first
//! sampler tick, or the fit and its report.

use drivetune_common::config::TuningConfig;
use drivetune_common::drive::DriveHandle;
use drivetune_common::series::{AccelResult, RampResult, SampleSeries};
use drivetune_common::signals::Signals;
use drivetune_common::telemetry::TelemetrySink;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{FitError, TuningError};
use crate::gate::{GateEvent, Phase, PhaseGate, SignalDebouncer, TransitionResult};
use crate::profile::RampPlan;
use crate::regression::{fit_accel, fit_ramp};
use crate::sampling::{ConstantPowerSampler, RampSampler, SamplerStatus};

const YES_NO_PROMPT: &str = "Press (Y/Δ) for yes, (B/O) for no";

/// Drive test currently commanding power.
#[derive(Debug)]
enum ActiveSampler {
    None,
    Ramp(RampSampler),
    Constant(ConstantPowerSampler),
}

/// Summary of a session, written by the CLI with `--report`.
#[derive(Debug, Clone, Serialize)]
pub struct TuningReport {
    pub config: TuningConfig,
    pub phase: Phase,
    pub fit_intercept: bool,
    pub fit_accel: bool,
    pub plan: Option<RampPlan>,
    pub ramp: Option<RampResult>,
    pub accel: Option<AccelResult>,
    pub ramp_samples: usize,
    pub accel_samples: usize,
    /// Last fit or planning failure, if any.
    pub error: Option<String>,
}

/// The feedforward identification routine.
#[derive(Debug)]
pub struct TuningSession {
    config: TuningConfig,
    gate: PhaseGate,
    debouncer: SignalDebouncer,
    plan: Option<RampPlan>,
    sampler: ActiveSampler,
    ramp_series: Option<SampleSeries>,
    accel_series: Option<SampleSeries>,
    ramp_result: Option<RampResult>,
    accel_result: Option<AccelResult>,
    error: Option<String>,
    prompted: bool,
}

impl TuningSession {
    /// Create a session waiting for start.
    ///
    /// # Errors
    /// `TuningError::InvalidConfig` for a distance ≤ 0, a max power outside
    /// (0, 1] or a non-finite value.
    pub fn new(config: TuningConfig) -> Result<Self, TuningError> {
        config.validate()?;
        Ok(Self {
            config,
            gate: PhaseGate::new(),
            debouncer: SignalDebouncer::new(),
            plan: None,
            sampler: ActiveSampler::None,
            ramp_series: None,
            accel_series: None,
            ramp_result: None,
            accel_result: None,
            error: None,
            prompted: false,
        })
    }

    /// Evaluate one control tick at time `now` [s] and return the resulting phase.
    pub fn tick<D, T>(&mut self, now: f64, signals: &Signals, drive: &mut D, telemetry: &mut T) -> Phase
    where
        D: DriveHandle + ?Sized,
        T: TelemetrySink + ?Sized,
    {
        if self.gate.phase() == Phase::Idle {
            return Phase::Idle;
        }

        if signals.stop_requested {
            self.stop(drive, telemetry);
            return self.gate.phase();
        }

        if !self.prompted {
            self.prompted = true;
            telemetry.clear();
            telemetry.add_line("Press play to begin the feedforward tuning routine");
            telemetry.update();
        }

        let event = self.debouncer.poll(signals);

        if self.gate.phase().is_sampling() {
            if let Some(event) = event {
                debug!("Ignoring {:?} while sampling", event);
            }
            if self.tick_sampler(drive, now) == SamplerStatus::Complete {
                self.apply(GateEvent::SamplingComplete, now, drive, telemetry);
            }
        } else if let Some(event) = event {
            self.apply(event, now, drive, telemetry);
        }

        self.gate.phase()
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.gate.phase()
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.gate.phase() == Phase::Idle
    }

    pub fn config(&self) -> &TuningConfig {
        &self.config
    }

    /// Test timing, available once the ramp phase has started.
    pub fn plan(&self) -> Option<&RampPlan> {
        self.plan.as_ref()
    }

    pub fn ramp_result(&self) -> Option<RampResult> {
        self.ramp_result
    }

    pub fn accel_result(&self) -> Option<AccelResult> {
        self.accel_result
    }

    /// Samples of the ramp phase, once it has ended (complete or stopped).
    pub fn ramp_series(&self) -> Option<&SampleSeries> {
        self.ramp_series.as_ref()
    }

    /// Samples of the constant-power phase, once it has ended.
    pub fn accel_series(&self) -> Option<&SampleSeries> {
        self.accel_series.as_ref()
    }

    #[inline]
    pub fn fit_intercept(&self) -> bool {
        self.gate.fit_intercept()
    }

    #[inline]
    pub fn fit_accel(&self) -> bool {
        self.gate.fit_accel()
    }

    pub fn report(&self) -> TuningReport {
        TuningReport {
            config: self.config,
            phase: self.gate.phase(),
            fit_intercept: self.gate.fit_intercept(),
            fit_accel: self.gate.fit_accel(),
            plan: self.plan,
            ramp: self.ramp_result,
            accel: self.accel_result,
            ramp_samples: self.ramp_series.as_ref().map_or(0, SampleSeries::len),
            accel_samples: self.accel_series.as_ref().map_or(0, SampleSeries::len),
            error: self.error.clone(),
        }
    }

    // ─── Internals ──────────────────────────────────────────────────

    fn stop<D, T>(&mut self, drive: &mut D, telemetry: &mut T)
    where
        D: DriveHandle + ?Sized,
        T: TelemetrySink + ?Sized,
    {
        let phase = self.gate.phase();
        self.finish_sampler(drive);
        drive.set_axis_power(0.0);
        if let TransitionResult::Ok(_) = self.gate.handle_event(GateEvent::Stop) {
            info!("Tuning stopped in {:?}", phase);
            telemetry.clear();
            telemetry.add_line("Tuning stopped");
            telemetry.update();
        }
    }

    /// Halt the active test, if any, and keep what it recorded.
    fn finish_sampler<D: DriveHandle + ?Sized>(&mut self, drive: &mut D) {
        match std::mem::replace(&mut self.sampler, ActiveSampler::None) {
            ActiveSampler::None => {}
            ActiveSampler::Ramp(mut s) => {
                if !s.is_finished() {
                    s.halt(drive);
                }
                self.ramp_series = Some(s.into_series());
            }
            ActiveSampler::Constant(mut s) => {
                if !s.is_finished() {
                    s.halt(drive);
                }
                self.accel_series = Some(s.into_series());
            }
        }
    }

    fn tick_sampler<D: DriveHandle + ?Sized>(&mut self, drive: &mut D, now: f64) -> SamplerStatus {
        match &mut self.sampler {
            ActiveSampler::None => SamplerStatus::Complete,
            ActiveSampler::Ramp(s) => s.tick(drive, now),
            ActiveSampler::Constant(s) => s.tick(drive, now),
        }
    }

    fn apply<D, T>(&mut self, event: GateEvent, now: f64, drive: &mut D, telemetry: &mut T)
    where
        D: DriveHandle + ?Sized,
        T: TelemetrySink + ?Sized,
    {
        match self.gate.handle_event(event) {
            TransitionResult::Ok(next) => {
                info!("Tuning phase -> {:?}", next);
                self.on_enter(next, now, drive, telemetry);
            }
            TransitionResult::Rejected(reason) => {
                debug!("Ignoring {:?}: {}", event, reason);
            }
        }
    }

    fn on_enter<D, T>(&mut self, phase: Phase, now: f64, drive: &mut D, telemetry: &mut T)
    where
        D: DriveHandle + ?Sized,
        T: TelemetrySink + ?Sized,
    {
        match phase {
            Phase::AwaitStart => {}
            Phase::AwaitInterceptChoice => {
                telemetry.clear();
                telemetry.add_line("Would you like to fit kStatic?");
                telemetry.add_line(YES_NO_PROMPT);
                telemetry.update();
            }
            Phase::AwaitRampConfirm => {
                telemetry.clear();
                telemetry.add_line(&format!(
                    "Place your robot on the field with at least {:.2} in of room in front",
                    self.config.distance
                ));
                telemetry.add_line("Press (Y/Δ) to begin");
                telemetry.update();
            }
            Phase::RunRamp => self.start_ramp(now, drive, telemetry),
            Phase::ReportRamp => self.report_ramp(now, drive, telemetry),
            Phase::AwaitAccelChoice => {
                // Appended to the ramp report frame.
                telemetry.add_line("Would you like to fit kA?");
                telemetry.add_line(YES_NO_PROMPT);
                telemetry.update();
            }
            Phase::AwaitAccelConfirm => {
                telemetry.clear();
                telemetry.add_line("Place the robot back in its starting position");
                telemetry.add_line("Press (Y/Δ) to continue");
                telemetry.update();
            }
            Phase::RunAccel => self.start_constant_power(now, drive, telemetry),
            Phase::ReportAccel => self.report_accel(now, drive, telemetry),
            Phase::Idle => {
                self.finish_sampler(drive);
                info!("Feedforward tuning finished");
            }
        }
    }

    fn start_ramp<D, T>(&mut self, now: f64, drive: &mut D, telemetry: &mut T)
    where
        D: DriveHandle + ?Sized,
        T: TelemetrySink + ?Sized,
    {
        let plan = match RampPlan::new(&self.config, drive.max_rated_velocity()) {
            Ok(plan) => plan,
            Err(e) => {
                warn!("Cannot plan the ramp test: {}", e);
                self.error = Some(e.to_string());
                telemetry.clear();
                telemetry.add_line(&format!("Cannot run the ramp test: {e}"));
                telemetry.update();
                self.apply(GateEvent::Stop, now, drive, telemetry);
                drive.set_axis_power(0.0);
                return;
            }
        };

        info!(
            "Ramp test: max_vel={:.3}, accel={:.5}, ramp_time={:.3}s",
            plan.max_vel, plan.accel, plan.ramp_time
        );
        self.plan = Some(plan);

        telemetry.clear();
        telemetry.add_line("Running...");
        telemetry.update();

        self.sampler = ActiveSampler::Ramp(RampSampler::start(plan, drive, now));
        if self.tick_sampler(drive, now) == SamplerStatus::Complete {
            self.apply(GateEvent::SamplingComplete, now, drive, telemetry);
        }
    }

    fn start_constant_power<D, T>(&mut self, now: f64, drive: &mut D, telemetry: &mut T)
    where
        D: DriveHandle + ?Sized,
        T: TelemetrySink + ?Sized,
    {
        let Some(plan) = self.plan else {
            warn!("Constant-power test entered without a ramp plan");
            self.apply(GateEvent::Stop, now, drive, telemetry);
            drive.set_axis_power(0.0);
            return;
        };

        telemetry.clear();
        telemetry.add_line("Running...");
        telemetry.update();

        self.sampler = ActiveSampler::Constant(ConstantPowerSampler::start(&plan, drive, now));
        if self.tick_sampler(drive, now) == SamplerStatus::Complete {
            self.apply(GateEvent::SamplingComplete, now, drive, telemetry);
        }
    }

    fn report_ramp<D, T>(&mut self, now: f64, drive: &mut D, telemetry: &mut T)
    where
        D: DriveHandle + ?Sized,
        T: TelemetrySink + ?Sized,
    {
        self.finish_sampler(drive);
        let fit_intercept = self.gate.fit_intercept();
        let fit = match &self.ramp_series {
            Some(series) => fit_ramp(series, fit_intercept),
            None => fit_ramp(&SampleSeries::new(), fit_intercept),
        };

        telemetry.clear();
        telemetry.add_line("Quasi-static ramp up test complete");

        let event = match fit {
            Ok(result) => {
                info!(
                    "Ramp fit: kV={:.5}, kStatic={:.5}, R^2={:.4}",
                    result.kv, result.k_static, result.r_square
                );
                if fit_intercept {
                    telemetry.add_line(&format!(
                        "kV = {:.5}, kStatic = {:.5} (R^2 = {:.2})",
                        result.kv, result.k_static, result.r_square
                    ));
                } else {
                    telemetry.add_line(&format!(
                        "kV = {:.5} (R^2 = {:.2})",
                        result.kv, result.r_square
                    ));
                }
                self.ramp_result = Some(result);
                GateEvent::Reported
            }
            Err(e) => {
                warn!("Ramp fit failed: {}", e);
                telemetry.add_line(&format!("Fit failed: {e}"));
                telemetry.update();
                self.error = Some(e.to_string());
                GateEvent::FitFailed
            }
        };

        self.apply(event, now, drive, telemetry);
    }

    fn report_accel<D, T>(&mut self, now: f64, drive: &mut D, telemetry: &mut T)
    where
        D: DriveHandle + ?Sized,
        T: TelemetrySink + ?Sized,
    {
        self.finish_sampler(drive);

        telemetry.clear();
        telemetry.add_line("Constant power test complete");

        let fit = match (&self.accel_series, self.ramp_result) {
            (Some(series), Some(ramp)) => fit_accel(series, ramp),
            (None, Some(ramp)) => fit_accel(&SampleSeries::new(), ramp),
            (_, None) => Err(FitError::DegenerateInput("no ramp result")),
        };

        let event = match fit {
            Ok(result) => {
                info!("Accel fit: kA={:.5}, R^2={:.4}", result.ka, result.r_square);
                telemetry.add_line(&format!(
                    "kA = {:.5} (R^2 = {:.2})",
                    result.ka, result.r_square
                ));
                self.accel_result = Some(result);
                GateEvent::Reported
            }
            Err(e) => {
                warn!("Accel fit failed: {}", e);
                telemetry.add_line(&format!("Fit failed: {e}"));
                self.error = Some(e.to_string());
                GateEvent::FitFailed
            }
        };
        telemetry.update();

        self.apply(event, now, drive, telemetry);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
