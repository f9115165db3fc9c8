//! Timestamp parsing and formatting.
//!
//! Trim commands take `HH:MM:SS.mmm` positions; CLI flags accept
//! `HH:MM:SS[.mmm]`, `MM:SS[.mmm]` or plain seconds.

use thiserror::Error;

/// Timestamp parsing error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimestampError {
    #[error("Timestamp cannot be empty")]
    Empty,

    #[error("Timestamp cannot be negative")]
    Negative,

    #[error("Invalid {0} value: {1}")]
    InvalidValue(&'static str, String),

    #[error("Invalid timestamp format '{0}'. Use HH:MM:SS, MM:SS, or seconds")]
    InvalidFormat(String),
}

/// Parse a timestamp string to total seconds.
///
/// # Examples
/// ```
/// use lsum_models::timestamp::parse_timestamp;
/// assert_eq!(parse_timestamp("01:30:00").unwrap(), 5400.0);
/// assert_eq!(parse_timestamp("05:30").unwrap(), 330.0);
/// assert_eq!(parse_timestamp("90").unwrap(), 90.0);
/// ```
pub fn parse_timestamp(ts: &str) -> Result<f64, TimestampError> {
    let ts = ts.trim();
    if ts.is_empty() {
        return Err(TimestampError::Empty);
    }

    const COMPONENTS: [&str; 3] = ["hours", "minutes", "seconds"];
    let parts: Vec<&str> = ts.split(':').collect();
    if parts.len() > COMPONENTS.len() {
        return Err(TimestampError::InvalidFormat(ts.to_string()));
    }

    // Align the last part with "seconds", the one before with "minutes", ...
    let names = &COMPONENTS[COMPONENTS.len() - parts.len()..];
    let mut total = 0.0;
    for (part, name) in parts.iter().zip(names) {
        let value: f64 = part
            .parse()
            .map_err(|_| TimestampError::InvalidValue(*name, part.to_string()))?;
        if value < 0.0 {
            return Err(TimestampError::Negative);
        }
        total = total * 60.0 + value;
    }

    Ok(total)
}

/// Format seconds as `HH:MM:SS`, adding `.mmm` only when there is a fraction.
pub fn format_seconds(total_secs: f64) -> String {
    let (hours, mins, secs) = split_hms(total_secs);

    if (secs - secs.floor()).abs() > 0.0001 {
        format!("{:02}:{:02}:{:06.3}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}:{:02}", hours, mins, secs.floor() as u32)
    }
}

/// Format seconds as `HH:MM:SS.mmm`, always with milliseconds.
///
/// Rounds to the nearest millisecond first so `25.0099999` becomes
/// `00:00:25.010` rather than `00:00:25.009`.
pub fn format_precise(total_secs: f64) -> String {
    let millis = (total_secs.max(0.0) * 1000.0).round() / 1000.0;
    let (hours, mins, secs) = split_hms(millis);
    format!("{:02}:{:02}:{:06.3}", hours, mins, secs)
}

fn split_hms(total_secs: f64) -> (u32, u32, f64) {
    let hours = (total_secs / 3600.0).floor() as u32;
    let mins = ((total_secs % 3600.0) / 60.0).floor() as u32;
    let secs = total_secs % 60.0;
    (hours, mins, secs)
}
