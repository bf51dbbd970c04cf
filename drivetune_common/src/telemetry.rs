//! Write-only telemetry sinks.
//!
//! A frame is built with `clear` / `add_line` / `add_data` and published with
//! `update`. Nothing read back from a sink feeds into control decisions.

use tracing::info;

/// Destination for operator-facing text.
pub trait TelemetrySink {
    /// Drop every line of the frame being built.
    fn clear(&mut self);

    /// Append a free-form line.
    fn add_line(&mut self, line: &str);

    /// Append a `caption: value` line.
    fn add_data(&mut self, caption: &str, value: &dyn std::fmt::Display) {
        self.add_line(&format!("{caption}: {value}"));
    }

    /// Publish the frame.
    fn update(&mut self);
}

/// Publishes each frame as `tracing` events on `update`.
#[derive(Debug, Default)]
pub struct TracingTelemetry {
    pending: Vec<String>,
}

impl TracingTelemetry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TelemetrySink for TracingTelemetry {
    fn clear(&mut self) {
        self.pending.clear();
    }

    fn add_line(&mut self, line: &str) {
        self.pending.push(line.to_string());
    }

    fn update(&mut self) {
        for line in self.pending.drain(..) {
            info!(target: "telemetry", "{line}");
        }
    }
}

/// Keeps every published frame in memory.
#[derive(Debug, Default)]
pub struct BufferedTelemetry {
    pending: Vec<String>,
    frames: Vec<Vec<String>>,
}

impl BufferedTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All published frames, oldest first.
    pub fn frames(&self) -> &[Vec<String>] {
        &self.frames
    }

    /// The most recently published frame.
    pub fn last_frame(&self) -> Option<&[String]> {
        self.frames.last().map(Vec::as_slice)
    }

    /// True if any published line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.frames
            .iter()
            .flatten()
            .any(|line| line.contains(needle))
    }
}

impl TelemetrySink for BufferedTelemetry {
    fn clear(&mut self) {
        self.pending.clear();
    }

    fn add_line(&mut self, line: &str) {
        self.pending.push(line.to_string());
    }

    fn update(&mut self) {
        self.frames.push(std::mem::take(&mut self.pending));
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffered_collects_frames() {
        let mut t = BufferedTelemetry::new();
        t.add_line("Running...");
        t.update();
        t.add_data("lift position", &120);
        t.update();
        assert_eq!(t.frames().len(), 2);
        assert_eq!(t.last_frame(), Some(&["lift position: 120".to_string()][..]));
        assert!(t.contains("Running"));
    }

    #[test]
    fn clear_discards_unpublished_lines() {
        let mut t = BufferedTelemetry::new();
        t.add_line("stale");
        t.clear();
        t.add_line("fresh");
        t.update();
        assert!(!t.contains("stale"));
        assert!(t.contains("fresh"));
    }
}
