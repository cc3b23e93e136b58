//! Timestamp formatting utilities
//!
//! Provides standardized, configurable timestamp formats for log output.
//! Supports ISO 8601, RFC 3339, Unix timestamps, and custom formats.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Standardized timestamp format options
///
/// # Examples
///
/// ```
/// use channel_logger::TimestampFormat;
/// use chrono::Utc;
///
/// let format = TimestampFormat::Iso8601;
/// let timestamp = format.format(&Utc::now());
/// assert!(timestamp.ends_with('Z'));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    Iso8601,

    /// ISO 8601 with microseconds: `2025-01-08T10:30:45.123456Z`
    ///
    /// Default for both formatters.
    #[default]
    Iso8601Micros,

    /// RFC 3339 format: `2025-01-08T10:30:45+00:00`
    Rfc3339,

    /// Unix timestamp in seconds: `1736332245`
    Unix,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Unix timestamp in microseconds: `1736332245123456`
    UnixMicros,

    /// Custom strftime format
    ///
    /// ```
    /// use channel_logger::TimestampFormat;
    ///
    /// // Apache log format
    /// let format = TimestampFormat::Custom("%d/%b/%Y:%H:%M:%S %z".to_string());
    /// ```
    Custom(String),
}

impl TimestampFormat {
    /// Format a `DateTime<Utc>` according to this format
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::Iso8601Micros => datetime.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::UnixMicros => datetime.timestamp_micros().to_string(),
            TimestampFormat::Custom(format_str) => format_custom(datetime, format_str)
                .unwrap_or_else(|| datetime.to_rfc3339()),
        }
    }

    /// Parse the name used in channel configuration, anything else is taken
    /// as a strftime pattern
    pub fn from_config(value: &str) -> Self {
        match value {
            "iso8601" => TimestampFormat::Iso8601,
            "iso8601_micros" => TimestampFormat::Iso8601Micros,
            "rfc3339" => TimestampFormat::Rfc3339,
            "unix" => TimestampFormat::Unix,
            "unix_millis" => TimestampFormat::UnixMillis,
            "unix_micros" => TimestampFormat::UnixMicros,
            other => TimestampFormat::Custom(other.to_string()),
        }
    }
}

/// strftime formatting that reports invalid patterns instead of panicking
pub fn format_custom(datetime: &DateTime<Utc>, pattern: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", datetime.format(pattern)).ok()?;
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_datetime() -> DateTime<Utc> {
        // 2025-01-08 10:30:45.123456 UTC
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::microseconds(123456)
    }

    #[test]
    fn test_iso8601_format() {
        let dt = fixed_datetime();
        assert_eq!(TimestampFormat::Iso8601.format(&dt), "2025-01-08T10:30:45.123Z");
    }

    #[test]
    fn test_iso8601_micros_format() {
        let dt = fixed_datetime();
        assert_eq!(
            TimestampFormat::Iso8601Micros.format(&dt),
            "2025-01-08T10:30:45.123456Z"
        );
    }

    #[test]
    fn test_unix_format() {
        let dt = fixed_datetime();
        assert_eq!(TimestampFormat::Unix.format(&dt), "1736332245");
        assert_eq!(TimestampFormat::UnixMillis.format(&dt), "1736332245123");
    }

    #[test]
    fn test_custom_format() {
        let dt = fixed_datetime();
        let format = TimestampFormat::Custom("%Y-%m-%d".to_string());
        assert_eq!(format.format(&dt), "2025-01-08");
    }

    #[test]
    fn test_invalid_custom_pattern_falls_back() {
        let dt = fixed_datetime();
        assert!(format_custom(&dt, "%Q").is_none());
        let format = TimestampFormat::Custom("%Q".to_string());
        assert_eq!(format.format(&dt), dt.to_rfc3339());
    }

    #[test]
    fn test_from_config() {
        assert_eq!(TimestampFormat::from_config("rfc3339"), TimestampFormat::Rfc3339);
        assert_eq!(
            TimestampFormat::from_config("%H:%M"),
            TimestampFormat::Custom("%H:%M".to_string())
        );
    }
}
