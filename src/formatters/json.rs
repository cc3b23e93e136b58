//! Structured JSON formatter, one object per record

use super::Formatter;
use crate::core::{Environment, LogContext, LogRecord, TimestampFormat};
use serde::Serialize;
use serde_json::json;

/// Emits `timestamp`, `level`, `channel`, `env`, `message`, plus `context`
/// and `extra` only when they carry something. Compatible with log
/// aggregation tools like ELK, Loki, etc.
///
/// A record that cannot be encoded (e.g. a NaN in its context) is replaced
/// by a minimal object with an `error` field instead of being lost.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    pretty: bool,
    timestamp_format: TimestampFormat,
}

#[derive(Serialize)]
struct JsonLine<'a> {
    timestamp: String,
    level: &'static str,
    channel: &'a str,
    env: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "is_empty")]
    context: &'a LogContext,
    #[serde(skip_serializing_if = "is_empty")]
    extra: &'a LogContext,
}

fn is_empty(fields: &&LogContext) -> bool {
    fields.is_empty()
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a JSON formatter with pretty printing
    pub fn new_pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    pub fn is_pretty(&self) -> bool {
        self.pretty
    }

    fn encode<T: Serialize>(&self, value: &T) -> serde_json::Result<String> {
        if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, record: &LogRecord, env: &Environment) -> String {
        let line = JsonLine {
            timestamp: self.timestamp_format.format(&record.timestamp),
            level: record.level.to_str(),
            channel: &record.channel,
            env: env.as_str(),
            message: &record.message,
            context: &record.context,
            extra: &record.extra,
        };

        match self.encode(&line) {
            Ok(json) => json,
            Err(e) => {
                let fallback = json!({
                    "timestamp": line.timestamp,
                    "level": line.level,
                    "channel": line.channel,
                    "env": line.env,
                    "message": line.message,
                    "error": format!("JSON encoding failed: {}", e),
                });
                fallback.to_string()
            }
        }
    }
}
