//! Fixed-period tick clock for the control loop.
//!
//! Time is derived from the tick count, so a simulated run sees exactly
//! `ticks · period` regardless of how fast the host executes. In realtime mode
//! `advance` also sleeps until the next tick boundary.

use std::time::{Duration, Instant};

use tracing::warn;

#[derive(Debug)]
pub struct TickClock {
    period: Duration,
    ticks: u64,
    realtime: bool,
    origin: Instant,
    overruns: u64,
}

impl TickClock {
    /// Clock that advances instantly.
    pub fn simulated(period_s: f64) -> Self {
        Self::new(period_s, false)
    }

    /// Clock that paces ticks against the wall clock.
    pub fn realtime(period_s: f64) -> Self {
        Self::new(period_s, true)
    }

    fn new(period_s: f64, realtime: bool) -> Self {
        Self {
            period: Duration::from_secs_f64(period_s),
            ticks: 0,
            realtime,
            origin: Instant::now(),
            overruns: 0,
        }
    }

    /// Time of the current tick [s].
    #[inline]
    pub fn now(&self) -> f64 {
        self.ticks as f64 * self.period.as_secs_f64()
    }

    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Ticks that finished after their deadline.
    #[inline]
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Move to the next tick.
    pub fn advance(&mut self) {
        self.ticks += 1;
        if !self.realtime {
            return;
        }

        let deadline = self.origin + self.period.mul_f64(self.ticks as f64);
        let now = Instant::now();
        if now < deadline {
            std::thread::sleep(deadline - now);
        } else {
            self.overruns += 1;
            if self.overruns <= 10 || self.overruns % 1000 == 0 {
                warn!(
                    "Tick overrun #{}: {}us late",
                    self.overruns,
                    (now - deadline).as_micros()
                );
            }
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_time_is_tick_count_times_period() {
        let mut clock = TickClock::simulated(0.02);
        assert_eq!(clock.now(), 0.0);
        for _ in 0..50 {
            clock.advance();
        }
        assert_eq!(clock.ticks(), 50);
        assert!((clock.now() - 1.0).abs() < 1e-9);
        assert_eq!(clock.overruns(), 0);
    }

    #[test]
    fn realtime_clock_waits_for_the_period() {
        let mut clock = TickClock::realtime(0.005);
        let start = Instant::now();
        for _ in 0..4 {
            clock.advance();
        }
        assert!(start.elapsed() >= Duration::from_millis(15));
    }
}
