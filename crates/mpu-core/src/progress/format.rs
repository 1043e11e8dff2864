//! Human-readable byte counts and durations.

/// Shown when no meaningful ETA exists (zero or negative rate).
pub const CALCULATING: &str = "Calculating...";

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Scale by 1024 through B, KB, MB, GB (no unit past GB), one decimal place.
pub fn format_bytes(bytes: f64) -> String {
    let mut value = bytes;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// `HhMm` from one hour up, `MmSs` from one minute up, else `Ss` (floored).
/// Non-finite or negative input yields [`CALCULATING`].
pub fn format_time_remaining(secs: f64) -> String {
    if !secs.is_finite() || secs < 0.0 {
        return CALCULATING.to_string();
    }
    let total = secs.floor() as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}h{}m", h, m)
    } else if m > 0 {
        format!("{}m{}s", m, s)
    } else {
        format!("{}s", s)
    }
}
