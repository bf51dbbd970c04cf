//! Phase gate transitions.
//!
//! AwaitStart → AwaitInterceptChoice → AwaitRampConfirm → RunRamp → ReportRamp
//! → AwaitAccelChoice → AwaitAccelConfirm → RunAccel → ReportAccel → Idle.
//!
//! Stop forces Idle from any state. Idle is terminal; a new run needs a new gate.

use serde::Serialize;
use tracing::debug;

/// Stage of the tuning routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Waiting for the host to start the routine.
    AwaitStart,
    /// Asking whether to fit kStatic.
    AwaitInterceptChoice,
    /// Waiting for the robot to be placed and confirmed.
    AwaitRampConfirm,
    /// Ramp test in progress.
    RunRamp,
    /// Fitting and reporting the ramp test.
    ReportRamp,
    /// Asking whether to fit kA.
    AwaitAccelChoice,
    /// Waiting for the robot to be put back and confirmed.
    AwaitAccelConfirm,
    /// Constant-power test in progress.
    RunAccel,
    /// Fitting and reporting the constant-power test.
    ReportAccel,
    /// Finished or stopped.
    Idle,
}

impl Phase {
    /// True for the states that poll the operator.
    #[inline]
    pub const fn is_awaiting(self) -> bool {
        matches!(
            self,
            Phase::AwaitStart
                | Phase::AwaitInterceptChoice
                | Phase::AwaitRampConfirm
                | Phase::AwaitAccelChoice
                | Phase::AwaitAccelConfirm
        )
    }

    /// True while a drive test is commanding power.
    #[inline]
    pub const fn is_sampling(self) -> bool {
        matches!(self, Phase::RunRamp | Phase::RunAccel)
    }
}

/// Event that can move the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEvent {
    /// Host started the op mode.
    Start,
    /// Confirm pressed and released.
    Confirm,
    /// Decline pressed and released.
    Decline,
    /// Sampler reached its duration.
    SamplingComplete,
    /// Fit reported on telemetry.
    Reported,
    /// Fit impossible; no coefficients.
    FitFailed,
    /// Host stop, or a test that cannot be planned.
    Stop,
}

/// Result of a transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition succeeded: new state.
    Ok(Phase),
    /// Transition rejected: reason.
    Rejected(&'static str),
}

/// Confirmation sequencer holding the current phase and the operator's choices.
#[derive(Debug, Clone)]
pub struct PhaseGate {
    phase: Phase,
    fit_intercept: bool,
    fit_accel: bool,
}

impl Default for PhaseGate {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseGate {
    /// Create a gate waiting for start.
    pub const fn new() -> Self {
        Self {
            phase: Phase::AwaitStart,
            fit_intercept: false,
            fit_accel: false,
        }
    }

    #[inline]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Operator chose to fit kStatic.
    #[inline]
    pub const fn fit_intercept(&self) -> bool {
        self.fit_intercept
    }

    /// Operator chose to run the constant-power test.
    #[inline]
    pub const fn fit_accel(&self) -> bool {
        self.fit_accel
    }

    /// Attempt a transition.
    pub fn handle_event(&mut self, event: GateEvent) -> TransitionResult {
        use GateEvent::*;
        use Phase::*;

        let next = match (self.phase, event) {
            (Idle, _) => return TransitionResult::Rejected("Idle: routine finished"),
            (_, Stop) => Idle,

            (AwaitStart, Start) => AwaitInterceptChoice,

            (AwaitInterceptChoice, Confirm) => {
                self.fit_intercept = true;
                AwaitRampConfirm
            }
            (AwaitInterceptChoice, Decline) => {
                self.fit_intercept = false;
                AwaitRampConfirm
            }

            (AwaitRampConfirm, Confirm) => RunRamp,
            (RunRamp, SamplingComplete) => ReportRamp,
            (ReportRamp, Reported) => AwaitAccelChoice,
            (ReportRamp, FitFailed) => Idle,

            (AwaitAccelChoice, Confirm) => {
                self.fit_accel = true;
                AwaitAccelConfirm
            }
            (AwaitAccelChoice, Decline) => Idle,

            (AwaitAccelConfirm, Confirm) => RunAccel,
            (RunAccel, SamplingComplete) => ReportAccel,
            (ReportAccel, Reported | FitFailed) => Idle,

            _ => return TransitionResult::Rejected(invalid_transition_reason(self.phase)),
        };

        debug!("Phase {:?} --{:?}--> {:?}", self.phase, event, next);
        self.phase = next;
        TransitionResult::Ok(next)
    }
}

fn invalid_transition_reason(phase: Phase) -> &'static str {
    use Phase::*;
    match phase {
        AwaitStart => "AwaitStart: only Start allowed",
        AwaitInterceptChoice => "AwaitInterceptChoice: only Confirm or Decline allowed",
        AwaitRampConfirm => "AwaitRampConfirm: only Confirm allowed",
        RunRamp | RunAccel => "sampling: only SamplingComplete or Stop allowed",
        ReportRamp | ReportAccel => "reporting: only Reported or FitFailed allowed",
        AwaitAccelChoice => "AwaitAccelChoice: only Confirm or Decline allowed",
        AwaitAccelConfirm => "AwaitAccelConfirm: only Confirm allowed",
        Idle => "Idle: routine finished",
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
