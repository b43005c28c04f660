//! Formatting helpers for timestamps and update ages.

use std::time::Duration;

use chrono::{DateTime, Local};

/// Formats a timestamp the way the tracker's own page does (full local
/// date and time, second precision).
#[must_use]
pub fn format_timestamp(ts: DateTime<Local>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Formats the age of the last successful update (e.g. "2s ago", "1m 05s ago").
#[must_use]
pub fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    if secs >= 3600 {
        format!(
            "{}h {:02}m {:02}s ago",
            secs / 3600,
            (secs % 3600) / 60,
            secs % 60
        )
    } else if secs >= 60 {
        format!("{}m {:02}s ago", secs / 60, secs % 60)
    } else {
        format!("{secs}s ago")
    }
}
