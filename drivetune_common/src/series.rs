//! Sample series and fitted feedforward results.

use serde::{Deserialize, Serialize};

/// One sample per control tick: elapsed time, measured position, commanded power.
///
/// The three sequences are only ever extended together through [`push`](Self::push),
/// so their lengths are equal at all times, including when empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleSeries {
    times: Vec<f64>,
    positions: Vec<f64>,
    powers: Vec<f64>,
}

impl SampleSeries {
    /// Create an empty series.
    pub const fn new() -> Self {
        Self {
            times: Vec::new(),
            positions: Vec::new(),
            powers: Vec::new(),
        }
    }

    /// Create an empty series with room for `capacity` ticks.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            times: Vec::with_capacity(capacity),
            positions: Vec::with_capacity(capacity),
            powers: Vec::with_capacity(capacity),
        }
    }

    /// Append one `(time, position, power)` triple.
    #[inline]
    pub fn push(&mut self, time: f64, position: f64, power: f64) {
        self.times.push(time);
        self.positions.push(position);
        self.powers.push(power);
    }

    /// Number of ticks recorded.
    #[inline]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Elapsed times [s], strictly increasing.
    #[inline]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    #[inline]
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    #[inline]
    pub fn powers(&self) -> &[f64] {
        &self.powers
    }

    /// Time of the most recent sample, if any.
    #[inline]
    pub fn last_time(&self) -> Option<f64> {
        self.times.last().copied()
    }
}

/// Result of the quasi-static ramp fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RampResult {
    /// Velocity feedforward gain [power per unit velocity].
    pub kv: f64,
    /// Static friction offset [power]; 0 when the intercept was not fitted.
    pub k_static: f64,
    /// Coefficient of determination of the fitted line.
    pub r_square: f64,
}

/// Result of the constant-power acceleration fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelResult {
    /// Acceleration feedforward gain [power per unit acceleration].
    pub ka: f64,
    /// Coefficient of determination of the fitted line.
    pub r_square: f64,
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_series_has_equal_lengths() {
        let s = SampleSeries::new();
        assert_eq!(s.times().len(), 0);
        assert_eq!(s.positions().len(), 0);
        assert_eq!(s.powers().len(), 0);
        assert!(s.is_empty());
        assert_eq!(s.last_time(), None);
    }

    #[test]
    fn push_extends_all_sequences() {
        let mut s = SampleSeries::with_capacity(4);
        s.push(0.0, 0.0, 0.0);
        s.push(0.02, 0.1, 0.05);
        assert_eq!(s.len(), 2);
        assert_eq!(s.positions(), &[0.0, 0.1]);
        assert_eq!(s.powers(), &[0.0, 0.05]);
        assert_eq!(s.last_time(), Some(0.02));
    }
}
