//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Requested channel has no configuration entry
    #[error("Logger channel '{channel}' is not configured")]
    ChannelNotConfigured { channel: String },

    /// Channel configuration names a driver nobody knows how to build
    #[error("Unsupported logger driver '{driver}' for channel '{channel}'")]
    UnsupportedDriver { channel: String, driver: String },

    /// Channel configuration has no `driver` key
    #[error("Logger channel '{channel}' has no driver configured")]
    MissingDriver { channel: String },

    /// Channel configuration is not a mapping, or a field has the wrong shape
    #[error("Invalid configuration for channel '{channel}': {message}")]
    InvalidChannelConfig { channel: String, message: String },

    /// Channel (transitively) includes itself
    #[error("Circular dependency detected for logger channel '{channel}'")]
    CircularDependency { channel: String },

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File lock error
    #[error("Failed to acquire file lock on '{path}'")]
    FileLockError { path: String },

    /// Sink-specific failure that has no underlying IO error
    #[error("Sink '{sink}' failed: {message}")]
    SinkError { sink: String, message: String },
}

impl LoggerError {
    pub fn not_configured(channel: impl Into<String>) -> Self {
        LoggerError::ChannelNotConfigured {
            channel: channel.into(),
        }
    }

    pub fn unsupported_driver(channel: impl Into<String>, driver: impl Into<String>) -> Self {
        LoggerError::UnsupportedDriver {
            channel: channel.into(),
            driver: driver.into(),
        }
    }

    pub fn missing_driver(channel: impl Into<String>) -> Self {
        LoggerError::MissingDriver {
            channel: channel.into(),
        }
    }

    /// Create an invalid channel configuration error
    pub fn invalid_config(channel: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidChannelConfig {
            channel: channel.into(),
            message: message.into(),
        }
    }

    /// Create a circular dependency error naming the channel found mid-resolution
    pub fn cycle(channel: impl Into<String>) -> Self {
        LoggerError::CircularDependency {
            channel: channel.into(),
        }
    }

    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    pub fn file_lock(path: impl Into<String>) -> Self {
        LoggerError::FileLockError { path: path.into() }
    }

    pub fn sink(sink: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::SinkError {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// True for every error that makes a `make` call fail because of configuration
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            LoggerError::ChannelNotConfigured { .. }
                | LoggerError::UnsupportedDriver { .. }
                | LoggerError::MissingDriver { .. }
                | LoggerError::InvalidChannelConfig { .. }
                | LoggerError::CircularDependency { .. }
        )
    }

    pub fn is_cycle(&self) -> bool {
        matches!(self, LoggerError::CircularDependency { .. })
    }

    /// Channel named by a configuration error
    pub fn channel(&self) -> Option<&str> {
        match self {
            LoggerError::ChannelNotConfigured { channel }
            | LoggerError::UnsupportedDriver { channel, .. }
            | LoggerError::MissingDriver { channel }
            | LoggerError::InvalidChannelConfig { channel, .. }
            | LoggerError::CircularDependency { channel } => Some(channel),
            _ => None,
        }
    }
}
