//! Log level definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The eight syslog severities, lowest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Debug = 0,
    Info = 1,
    Notice = 2,
    Warning = 3,
    Error = 4,
    Critical = 5,
    Alert = 6,
    Emergency = 7,
}

impl LogLevel {
    pub const ALL: [LogLevel; 8] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Notice,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Critical,
        LogLevel::Alert,
        LogLevel::Emergency,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Notice => "NOTICE",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
            LogLevel::Alert => "ALERT",
            LogLevel::Emergency => "EMERGENCY",
        }
    }

    /// Lenient parse: common spellings map to their canonical level and
    /// anything unrecognized becomes `Debug`.
    ///
    /// ```
    /// use channel_logger::LogLevel;
    ///
    /// assert_eq!(LogLevel::normalize("warn"), LogLevel::Warning);
    /// assert_eq!(LogLevel::normalize("fatal"), LogLevel::Critical);
    /// assert_eq!(LogLevel::normalize("loud"), LogLevel::Debug);
    /// ```
    pub fn normalize(s: &str) -> Self {
        s.parse().unwrap_or(LogLevel::Debug)
    }

    /// Syslog priority (RFC 5424 severity) for this level
    pub fn syslog_priority(&self) -> i32 {
        match self {
            LogLevel::Emergency => 0,
            LogLevel::Alert => 1,
            LogLevel::Critical => 2,
            LogLevel::Error => 3,
            LogLevel::Warning => 4,
            LogLevel::Notice => 5,
            LogLevel::Info => 6,
            LogLevel::Debug => 7,
        }
    }

    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Emergency | LogLevel::Alert | LogLevel::Critical => BrightRed,
            LogLevel::Error => Red,
            LogLevel::Warning => Yellow,
            LogLevel::Notice => Cyan,
            LogLevel::Info => Green,
            LogLevel::Debug => White,
        }
    }

    /// Error and above go to the error stream on consoles
    pub fn is_error(&self) -> bool {
        *self >= LogLevel::Error
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" | "trace" => Ok(LogLevel::Debug),
            "info" | "information" => Ok(LogLevel::Info),
            "notice" | "note" => Ok(LogLevel::Notice),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "error" | "err" => Ok(LogLevel::Error),
            "critical" | "crit" | "fatal" => Ok(LogLevel::Critical),
            "alert" => Ok(LogLevel::Alert),
            "emergency" | "emerg" | "panic" => Ok(LogLevel::Emergency),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        for pair in LogLevel::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!(LogLevel::normalize("WARN"), LogLevel::Warning);
        assert_eq!(LogLevel::normalize("err"), LogLevel::Error);
        assert_eq!(LogLevel::normalize("crit"), LogLevel::Critical);
        assert_eq!(LogLevel::normalize("panic"), LogLevel::Emergency);
        assert_eq!(LogLevel::normalize("trace"), LogLevel::Debug);
        assert_eq!(LogLevel::normalize("note"), LogLevel::Notice);
    }

    #[test]
    fn test_unknown_defaults_to_debug() {
        assert!("verbose".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::normalize("verbose"), LogLevel::Debug);
        assert_eq!(LogLevel::normalize(""), LogLevel::Debug);
    }

    #[test]
    fn test_syslog_priority() {
        assert_eq!(LogLevel::Emergency.syslog_priority(), 0);
        assert_eq!(LogLevel::Warning.syslog_priority(), 4);
        assert_eq!(LogLevel::Debug.syslog_priority(), 7);
    }
}
