//! Lift position PID with backward Euler integration.
//!
//! Zero ki disables the integral; zero kd disables the derivative.

use drivetune_common::mechanisms::PidCoefficients;

/// Internal state of the lift PID.
///
/// Must be reset when the gains change so a stale integral does not kick the lift.
#[derive(Debug, Clone, Copy, Default)]
pub struct PidState {
    /// Integral accumulator.
    integral: f64,
    /// Previous position error (for derivative).
    prev_error: f64,
    /// False until the first cycle has seeded `prev_error`.
    primed: bool,
}

impl PidState {
    /// Reset all internal state to zero.
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Compute one PID cycle.
///
/// # Arguments
/// - `state`: Mutable PID internal state.
/// - `gains`: Lift PID coefficients.
/// - `error`: Target − actual [ticks].
/// - `dt`: Cycle period [s].
///
/// # Returns
/// Unsaturated output; clamping to the lift power limit is done by the caller.
#[inline]
pub fn pid_compute(state: &mut PidState, gains: &PidCoefficients, error: f64, dt: f64) -> f64 {
    if dt <= 0.0 {
        return 0.0;
    }

    let p_term = gains.kp * error;

    let i_term = if gains.ki != 0.0 {
        state.integral += gains.ki * error * dt;
        state.integral
    } else {
        state.integral = 0.0;
        0.0
    };

    // No derivative kick on the first cycle.
    let d_term = if gains.kd != 0.0 && state.primed {
        gains.kd * (error - state.prev_error) / dt
    } else {
        0.0
    };

    state.prev_error = error;
    state.primed = true;

    p_term + i_term + d_term
}

// ─── Tests ──────────────────────────────────────────────────────────
