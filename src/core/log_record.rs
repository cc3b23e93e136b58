//! Log record structure and the environment tag records are emitted under

use super::log_context::LogContext;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use std::fmt;

/// Context key the pipeline stores the environment tag under
pub const ENV_KEY: &str = "env";

/// A single log call on its way through processors and the formatter
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    pub context: LogContext,
    /// Populated by processors only
    pub extra: LogContext,
    pub channel: String,
    pub timestamp: DateTime<Utc>,
}

impl LogRecord {
    pub fn new(level: LogLevel, message: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            context: LogContext::new(),
            extra: LogContext::new(),
            channel: channel.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_context(mut self, context: LogContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_extra(mut self, extra: LogContext) -> Self {
        self.extra = extra;
        self
    }
}

/// Deployment environment a logger runs under (`production`, `staging`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Environment(String);

impl Environment {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Level used by `smart_log` in this environment
    pub fn smart_level(&self) -> LogLevel {
        match self.0.as_str() {
            "production" | "prod" => LogLevel::Info,
            "staging" | "preprod" => LogLevel::Notice,
            "testing" | "test" => LogLevel::Warning,
            _ => LogLevel::Debug,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new("dev")
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Environment {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smart_level() {
        assert_eq!(Environment::new("production").smart_level(), LogLevel::Info);
        assert_eq!(Environment::new("PROD").smart_level(), LogLevel::Info);
        assert_eq!(Environment::new("staging").smart_level(), LogLevel::Notice);
        assert_eq!(Environment::new("preprod").smart_level(), LogLevel::Notice);
        assert_eq!(Environment::new("test").smart_level(), LogLevel::Warning);
        assert_eq!(Environment::new("dev").smart_level(), LogLevel::Debug);
        assert_eq!(Environment::new("local").smart_level(), LogLevel::Debug);
    }

    #[test]
    fn test_record_starts_with_empty_extra() {
        let record = LogRecord::new(LogLevel::Info, "hello", "app");
        assert!(record.extra.is_empty());
        assert!(record.context.is_empty());
        assert_eq!(record.channel, "app");
    }
}
