//! Human-readable duration formatting
//!
//! Annotation durations are usually seconds, occasionally minutes; the format
//! is chosen by magnitude.

/// Format selection thresholds (seconds)
const SHORT_FORMAT_MAX: f64 = 100.0; // < 100s → X.XXs
const MEDIUM_FORMAT_MAX: f64 = 6000.0; // < 100m → M:SS.Xs
                                       // >= 100m → H:MM:SS

/// Format a duration in seconds for display
///
/// # Examples
///
/// ```
/// use appraise_common::human_time::format_duration;
///
/// assert_eq!(format_duration(12.5), "12.50s");
/// assert_eq!(format_duration(330.0), "5:30.0s");
/// assert_eq!(format_duration(7322.0), "2:02:02");
/// ```
pub fn format_duration(seconds: f64) -> String {
    let is_negative = seconds < 0.0;
    let abs_seconds = seconds.abs();

    let formatted = if abs_seconds < SHORT_FORMAT_MAX {
        format!("{:.2}s", abs_seconds)
    } else if abs_seconds < MEDIUM_FORMAT_MAX {
        let tenths = (abs_seconds * 10.0).round() as i64;
        let minutes = tenths / 600;
        let secs = (tenths % 600) as f64 / 10.0;
        format!("{}:{:04.1}s", minutes, secs)
    } else {
        let whole = abs_seconds.round() as i64;
        let hours = whole / 3600;
        let mins = (whole % 3600) / 60;
        let secs = whole % 60;
        format!("{}:{:02}:{:02}", hours, mins, secs)
    };

    if is_negative {
        format!("-{}", formatted)
    } else {
        formatted
    }
}

/// Format an optional duration; `None` renders as "n/a"
pub fn format_duration_opt(seconds: Option<f64>) -> String {
    match seconds {
        Some(seconds) => format_duration(seconds),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_format() {
        assert_eq!(format_duration(0.0), "0.00s");
        assert_eq!(format_duration(5.25), "5.25s");
        assert_eq!(format_duration(99.0), "99.00s");
    }

    #[test]
    fn test_medium_format() {
        assert_eq!(format_duration(100.0), "1:40.0s");
        assert_eq!(format_duration(119.96), "2:00.0s");
        assert_eq!(format_duration(5999.0), "99:59.0s");
    }

    #[test]
    fn test_long_format() {
        assert_eq!(format_duration(6000.0), "1:40:00");
        assert_eq!(format_duration(3661.0 * 2.0), "2:02:02");
    }

    #[test]
    fn test_negative_and_missing() {
        assert_eq!(format_duration(-5.0), "-5.00s");
        assert_eq!(format_duration_opt(None), "n/a");
        assert_eq!(format_duration_opt(Some(1.5)), "1.50s");
    }
}
