//! Operator and host signals sampled once per tick.
//!
//! Gamepad decoding is done by the host runtime; the tuner only sees the
//! resulting boolean levels.

/// Raw signal levels for one control tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signals {
    /// Host "play" pressed (op mode started).
    pub start: bool,
    /// Confirm button held (Y / Δ).
    pub confirm: bool,
    /// Decline button held (B / O).
    pub decline: bool,
    /// Host asked the routine to stop.
    pub stop_requested: bool,
}

impl Signals {
    /// No button held, no stop.
    pub const IDLE: Self = Self {
        start: false,
        confirm: false,
        decline: false,
        stop_requested: false,
    };

    /// Started, nothing held.
    pub const fn started() -> Self {
        Self {
            start: true,
            ..Self::IDLE
        }
    }

    /// Started with confirm held.
    pub const fn confirm() -> Self {
        Self {
            confirm: true,
            ..Self::started()
        }
    }

    /// Started with decline held.
    pub const fn decline() -> Self {
        Self {
            decline: true,
            ..Self::started()
        }
    }

    /// Stop asserted.
    pub const fn stop() -> Self {
        Self {
            stop_requested: true,
            ..Self::IDLE
        }
    }
}

/// Source of per-tick signal levels (gamepad + host runtime).
pub trait SignalSource {
    /// Sample the signals for the current tick.
    fn poll(&mut self) -> Signals;
}
