//! Timing helpers

use std::time::{Duration, Instant};

/// Measures how long one example takes
#[derive(Debug)]
pub struct Timer {
    start: Instant,
    label: String,
}

impl Timer {
    /// Create and start a new timer
    pub fn start(label: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            label: label.into(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Elapsed time in milliseconds, logged at debug level
    pub fn elapsed_ms(&self) -> u64 {
        let ms = u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::debug!("{}: {}ms", self.label, ms);
        ms
    }
}

/// Human readable duration, e.g. `2m 05s` or `850ms`
pub fn format_duration(ms: u64) -> String {
    if ms < 1_000 {
        return format!("{ms}ms");
    }
    let secs = ms / 1_000;
    if secs < 60 {
        format!("{}.{}s", secs, (ms % 1_000) / 100)
    } else {
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}
