//! Edge-then-release debouncing of the operator buttons.
//!
//! A button yields an event only after it goes from released to held and then
//! back to released, so one physical press is exactly one event no matter how
//! many ticks it spans.

use drivetune_common::signals::Signals;

use super::machine::GateEvent;

/// Operator button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Confirm,
    Decline,
}

impl Button {
    #[inline]
    const fn is_held(self, signals: &Signals) -> bool {
        match self {
            Button::Confirm => signals.confirm,
            Button::Decline => signals.decline,
        }
    }

    #[inline]
    const fn event(self) -> GateEvent {
        match self {
            Button::Confirm => GateEvent::Confirm,
            Button::Decline => GateEvent::Decline,
        }
    }
}

/// Turns per-tick signal levels into gate events.
#[derive(Debug, Clone, Default)]
pub struct SignalDebouncer {
    prev_confirm: bool,
    prev_decline: bool,
    /// Button pressed and not yet released.
    held: Option<Button>,
    started: bool,
}

impl SignalDebouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Button currently latched, waiting for release.
    #[inline]
    pub fn held(&self) -> Option<Button> {
        self.held
    }

    /// Evaluate one tick. Stop is not handled here.
    pub fn poll(&mut self, signals: &Signals) -> Option<GateEvent> {
        let confirm_edge = signals.confirm && !self.prev_confirm;
        let decline_edge = signals.decline && !self.prev_decline;
        self.prev_confirm = signals.confirm;
        self.prev_decline = signals.decline;

        if signals.start && !self.started {
            self.started = true;
            return Some(GateEvent::Start);
        }

        if let Some(button) = self.held {
            if button.is_held(signals) {
                return None;
            }
            self.held = None;
            return Some(button.event());
        }

        // Confirm wins a simultaneous press.
        if confirm_edge {
            self.held = Some(Button::Confirm);
        } else if decline_edge {
            self.held = Some(Button::Decline);
        }
        None
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
