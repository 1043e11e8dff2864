//! Upload progress: instantaneous throughput, ETA and percent complete.
//!
//! The orchestrator feeds the tracker once per wave with the confirmed byte
//! count; the tracker turns the delta since the previous observation into a
//! rate and a human-readable ETA.

mod format;

pub use format::{format_bytes, format_time_remaining, CALCULATING};

use std::time::Instant;

/// Percent of `total` covered by `done`, clamped to [0, 100]. An empty file is 100% done.
pub fn percent_complete(done: u64, total: u64) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (done as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

/// Rate and ETA derived from one observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Throughput {
    pub bytes_per_sec: f64,
    /// Formatted rate, e.g. `"1.5 MB"` (per second).
    pub speed: String,
    /// Formatted ETA, or [`CALCULATING`].
    pub time_remaining: String,
}

/// Progress event delivered to the caller after each wave.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub percent_complete: f64,
    pub uploaded_size: u64,
    pub speed: String,
    pub time_remaining: String,
    pub completed_parts: u32,
    pub total_parts: u32,
}

/// Instantaneous rate estimator over uploaded-byte deltas.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    file_size: u64,
    last_bytes: u64,
    last_at: Instant,
}

impl ProgressTracker {
    pub fn new(file_size: u64, start: Instant) -> Self {
        Self::with_baseline(file_size, 0, start)
    }

    /// Tracker whose previous observation is `(bytes, at)`. Used when
    /// re-entering the loop after a pause so the paused interval is not
    /// counted as zero throughput.
    pub fn with_baseline(file_size: u64, bytes: u64, at: Instant) -> Self {
        Self {
            file_size,
            last_bytes: bytes,
            last_at: at,
        }
    }

    /// Record that `uploaded` bytes are done at `now`.
    ///
    /// Returns `None` (and keeps the previous baseline) when no time has
    /// passed since the last observation.
    pub fn observe(&mut self, uploaded: u64, now: Instant) -> Option<Throughput> {
        let dt = now.saturating_duration_since(self.last_at).as_secs_f64();
        if dt <= 0.0 {
            return None;
        }
        let delta = uploaded as f64 - self.last_bytes as f64;
        let bytes_per_sec = delta / dt;
        let remaining = self.file_size as f64 - uploaded as f64;
        let eta = remaining / bytes_per_sec;

        self.last_bytes = uploaded;
        self.last_at = now;

        Some(Throughput {
            bytes_per_sec,
            speed: format_bytes(bytes_per_sec.max(0.0)),
            time_remaining: format_time_remaining(eta),
        })
    }
}
