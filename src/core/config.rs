//! Logging configuration: channel table plus typed access to channel entries

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::log_record::Environment;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Channel used by `make(None)` when `default` is not set
pub const DEFAULT_CHANNEL: &str = "stack";

/// Environment used when `env` is not set
pub const DEFAULT_ENV: &str = "dev";

/// Top-level configuration handed to the factory.
///
/// Each channel is a JSON object with a mandatory `driver` key; everything
/// else in it is driver-specific and read through [`ChannelConfig`].
///
/// ```
/// use channel_logger::core::LoggingConfig;
/// use serde_json::json;
///
/// let config = LoggingConfig::new()
///     .default_channel("app")
///     .env("production")
///     .channel("app", json!({"driver": "stack", "channels": ["file", "console"]}))
///     .channel("file", json!({"driver": "file", "path": "logs/app-{date}.log"}))
///     .channel("console", json!({"driver": "console", "level": "warning"}));
///
/// assert_eq!(config.default_channel_name(), "app");
/// assert_eq!(config.environment().as_str(), "production");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    #[serde(default)]
    pub channels: HashMap<String, Value>,
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deserialize from an already-loaded value (JSON, or anything converted
    /// into a `serde_json::Value`)
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn default_channel(mut self, name: impl Into<String>) -> Self {
        self.default = Some(name.into());
        self
    }

    #[must_use]
    pub fn env(mut self, env: impl Into<String>) -> Self {
        self.env = Some(env.into());
        self
    }

    #[must_use]
    pub fn channel(mut self, name: impl Into<String>, config: Value) -> Self {
        self.channels.insert(name.into(), config);
        self
    }

    pub fn default_channel_name(&self) -> &str {
        self.default.as_deref().unwrap_or(DEFAULT_CHANNEL)
    }

    pub fn environment(&self) -> Environment {
        Environment::new(self.env.as_deref().unwrap_or(DEFAULT_ENV))
    }

    pub fn channel_value(&self, name: &str) -> Option<&Value> {
        self.channels.get(name)
    }

    pub fn is_configured(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }
}

/// Logger kinds a channel can be built as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Driver {
    Stack,
    File,
    Console,
    Syslog,
    ErrorLog,
    Null,
    Buffer,
}

impl Driver {
    /// `native` and `error_log` are accepted for `errorlog`
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "stack" => Some(Driver::Stack),
            "file" => Some(Driver::File),
            "console" => Some(Driver::Console),
            "syslog" => Some(Driver::Syslog),
            "errorlog" | "error_log" | "native" => Some(Driver::ErrorLog),
            "null" => Some(Driver::Null),
            "buffer" => Some(Driver::Buffer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::Stack => "stack",
            Driver::File => "file",
            Driver::Console => "console",
            Driver::Syslog => "syslog",
            Driver::ErrorLog => "errorlog",
            Driver::Null => "null",
            Driver::Buffer => "buffer",
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read-only view over one channel's configuration object.
///
/// Getters fall back to their default when a key is absent or holds a value
/// of the wrong type.
#[derive(Debug, Clone, Copy)]
pub struct ChannelConfig<'a> {
    name: &'a str,
    fields: &'a Map<String, Value>,
}

impl<'a> ChannelConfig<'a> {
    /// Fails with `InvalidChannelConfig` unless `value` is an object
    pub fn new(name: &'a str, value: &'a Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { name, fields }),
            other => Err(LoggerError::invalid_config(
                name,
                format!("expected a mapping, found {}", json_type(other)),
            )),
        }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    /// Declared driver; absent or non-string is `MissingDriver`, unknown is
    /// `UnsupportedDriver`
    pub fn driver(&self) -> Result<Driver> {
        let name = self
            .get("driver")
            .and_then(Value::as_str)
            .ok_or_else(|| LoggerError::missing_driver(self.name))?;
        Driver::from_name(name).ok_or_else(|| LoggerError::unsupported_driver(self.name, name))
    }

    pub fn opt_str(&self, key: &str) -> Option<&'a str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn str_or(&self, key: &str, default: &str) -> String {
        self.opt_str(key).unwrap_or(default).to_string()
    }

    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn int_or(&self, key: &str, default: i64) -> i64 {
        self.get(key).and_then(Value::as_i64).unwrap_or(default)
    }

    /// String entries of an array; other entries are dropped
    pub fn string_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Raw entries of an array, for lists of mixed shapes
    pub fn list(&self, key: &str) -> &'a [Value] {
        self.get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Minimum level, `debug` when unset; unknown names also mean debug
    pub fn level(&self) -> LogLevel {
        self.opt_str("level")
            .map(LogLevel::normalize)
            .unwrap_or(LogLevel::Debug)
    }

    /// Channel name records carry; defaults to the configuration key
    pub fn display_name(&self) -> String {
        self.str_or("channel", self.name)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
