//! Time display and parsing helpers

use crate::error::{Result, ReviewError};

/// Format seconds as `MM:SS` (minutes keep counting past 59)
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Parse `HH:MM:SS` or `MM:SS` into seconds
pub fn parse_timestamp(value: &str) -> Result<f64> {
    let malformed = || ReviewError::RecordFormat {
        field: "timestamp",
        value: value.to_string(),
    };

    let parts: Vec<&str> = value.trim().split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(malformed());
    }

    let mut numbers = Vec::with_capacity(parts.len());
    for part in &parts {
        let n: u64 = part.parse().map_err(|_| malformed())?;
        numbers.push(n);
    }

    // minutes and seconds fields must stay below 60
    let (hours, minutes, seconds) = match numbers.as_slice() {
        [m, s] => (0, *m, *s),
        [h, m, s] => (*h, *m, *s),
        _ => return Err(malformed()),
    };
    if seconds >= 60 || (parts.len() == 3 && minutes >= 60) {
        return Err(malformed());
    }

    let total = hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(seconds))
        .ok_or_else(malformed)?;
    Ok(total as f64)
}
