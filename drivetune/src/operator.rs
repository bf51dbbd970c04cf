//! Signal sources that stand in for a human at the gamepad.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use drivetune_common::signals::{SignalSource, Signals};

use crate::gate::{Button, Phase};

/// Ticks a scripted button is held before release.
pub const DEFAULT_HOLD_TICKS: u32 = 3;

/// Answers every prompt of the routine with a fixed choice.
///
/// The host "play" level is asserted from the first tick. Each waiting phase
/// gets exactly one press (held for `hold_ticks`, then released); call
/// [`observe`](Self::observe) with the session phase after every tick.
#[derive(Debug, Clone)]
pub struct ScriptedOperator {
    fit_static: bool,
    fit_accel: bool,
    hold_ticks: u32,
    phase: Phase,
    answered: Option<Phase>,
    /// Button being held and the ticks left before release.
    pressing: Option<(Button, u32)>,
    stop: Arc<AtomicBool>,
}

impl ScriptedOperator {
    pub fn new(fit_static: bool, fit_accel: bool) -> Self {
        Self {
            fit_static,
            fit_accel,
            hold_ticks: DEFAULT_HOLD_TICKS,
            phase: Phase::AwaitStart,
            answered: None,
            pressing: None,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Hold each press for `ticks` ticks (at least one).
    pub fn with_hold_ticks(mut self, ticks: u32) -> Self {
        self.hold_ticks = ticks.max(1);
        self
    }

    /// Share a stop flag, e.g. one set from a Ctrl-C handler.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    /// Handle for requesting a stop from elsewhere.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Record the phase the session reached on the last tick.
    pub fn observe(&mut self, phase: Phase) {
        self.phase = phase;
    }

    fn answer(&self, phase: Phase) -> Option<Button> {
        let choice = |yes: bool| if yes { Button::Confirm } else { Button::Decline };
        match phase {
            Phase::AwaitInterceptChoice => Some(choice(self.fit_static)),
            Phase::AwaitRampConfirm | Phase::AwaitAccelConfirm => Some(Button::Confirm),
            Phase::AwaitAccelChoice => Some(choice(self.fit_accel)),
            _ => None,
        }
    }
}

fn holding(button: Button) -> Signals {
    match button {
        Button::Confirm => Signals::confirm(),
        Button::Decline => Signals::decline(),
    }
}

impl SignalSource for ScriptedOperator {
    fn poll(&mut self) -> Signals {
        if self.stop.load(Ordering::SeqCst) {
            return Signals::stop();
        }

        if let Some((button, left)) = self.pressing {
            if left == 0 {
                self.pressing = None;
                return Signals::started();
            }
            self.pressing = Some((button, left - 1));
            return holding(button);
        }

        if self.answered != Some(self.phase) {
            if let Some(button) = self.answer(self.phase) {
                self.answered = Some(self.phase);
                self.pressing = Some((button, self.hold_ticks - 1));
                return holding(button);
            }
        }

        Signals::started()
    }
}

/// Replays a fixed list of per-tick signals, then repeats the last entry.
#[derive(Debug, Clone, Default)]
pub struct SignalScript {
    ticks: Vec<Signals>,
    cursor: usize,
}

impl SignalScript {
    pub fn new(ticks: Vec<Signals>) -> Self {
        Self { ticks, cursor: 0 }
    }

    /// Append `signals` for `count` ticks.
    pub fn hold(mut self, signals: Signals, count: usize) -> Self {
        self.ticks.extend(std::iter::repeat_n(signals, count));
        self
    }

    /// Append one press of `held`: held for `count` ticks, then released.
    pub fn press(self, held: Signals, count: usize) -> Self {
        self.hold(held, count).hold(Signals::started(), 1)
    }

    pub fn remaining(&self) -> usize {
        self.ticks.len().saturating_sub(self.cursor)
    }
}

impl SignalSource for SignalScript {
    fn poll(&mut self) -> Signals {
        let signals = match self.ticks.get(self.cursor) {
            Some(s) => *s,
            None => self.ticks.last().copied().unwrap_or(Signals::IDLE),
        };
        self.cursor += 1;
        signals
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
