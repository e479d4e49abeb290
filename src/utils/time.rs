//! Duration parsing and formatting

use crate::error::{CnvtError, CnvtResult};

/// Parse a duration given as seconds, MM:SS[.ms] or HH:MM:SS[.ms]
pub fn parse_duration(value: &str) -> CnvtResult<f64> {
    let value = value.trim();

    let parts: Vec<&str> = value.split(':').collect();
    let seconds = match parts.as_slice() {
        [secs] => secs.parse::<f64>().ok(),
        [mins, secs] => parse_fields(&[("minutes", mins)], secs),
        [hours, mins, secs] => parse_fields(&[("hours", hours), ("minutes", mins)], secs),
        _ => None,
    };

    match seconds {
        Some(s) if s >= 0.0 => Ok(s),
        _ => Err(CnvtError::config(format!(
            "invalid duration '{}', expected seconds, MM:SS[.ms] or HH:MM:SS[.ms]",
            value
        ))),
    }
}

fn parse_fields(whole: &[(&str, &str)], secs: &str) -> Option<f64> {
    let mut total = secs.parse::<f64>().ok()?;
    let mut scale = 60.0;
    for (_, field) in whole.iter().rev() {
        total += field.parse::<u32>().ok()? as f64 * scale;
        scale *= 60.0;
    }
    Some(total)
}

/// Format seconds as HH:MM:SS.mmm, the form ffmpeg accepts for `-t`.
/// Rounded to whole milliseconds before splitting into fields so a
/// fractional carry propagates into the seconds.
pub fn format_duration(seconds: f64) -> String {
    let total_millis = (seconds * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = total_millis % 3_600_000 / 60_000;
    let secs = total_millis % 60_000 / 1000;
    let millis = total_millis % 1000;
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_seconds() {
        assert_eq!(parse_duration("90.5").unwrap(), 90.5);
        assert_eq!(parse_duration("0").unwrap(), 0.0);
    }

    #[test]
    fn parses_minute_and_hour_forms() {
        assert_eq!(parse_duration("01:30").unwrap(), 90.0);
        assert_eq!(parse_duration("01:30.500").unwrap(), 90.5);
        assert_eq!(parse_duration("01:00:00").unwrap(), 3600.0);
        assert_eq!(parse_duration("02:03:04.250").unwrap(), 7384.25);
    }

    #[test]
    fn rejects_invalid_forms() {
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("1:2:3:4").is_err());
        assert!(parse_duration("-5").is_err());
        assert!(parse_duration("xx:30").is_err());
    }

    #[test]
    fn formats_round_trip() {
        assert_eq!(format_duration(90.5), "00:01:30.500");
        assert_eq!(format_duration(3661.0), "01:01:01.000");
    }

    #[test]
    fn millisecond_rounding_carries_into_seconds() {
        assert_eq!(format_duration(90.9999), "00:01:31.000");
        assert_eq!(format_duration(59.9996), "00:01:00.000");
        assert_eq!(format_duration(3599.9999), "01:00:00.000");
    }
}
