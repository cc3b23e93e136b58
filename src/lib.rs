//! # Channel Logger
//!
//! Channel-based logging: named channels are built from configuration by a
//! factory and share one record pipeline.
//!
//! ## Features
//!
//! - **Channels**: file, console, syslog, native error log, null, plus
//!   `stack` (fan-out) and `buffer` (deferred delivery) composites
//! - **Cycle Detection**: a channel can never include itself, directly or
//!   through other stacks and buffers
//! - **Pipeline**: level filter, environment tagging, exception
//!   normalization, processors, line or JSON formatting
//! - **Thread Safe**: loggers are `Send + Sync` and shared as `Arc<dyn Logger>`
//!
//! ## Example
//!
//! ```
//! use channel_logger::prelude::*;
//! use serde_json::json;
//!
//! let config = LoggingConfig::new()
//!     .env("production")
//!     .channel("stack", json!({"driver": "stack", "channels": ["errors", "null"]}))
//!     .channel("errors", json!({"driver": "errorlog", "level": "error"}))
//!     .channel("null", json!({"driver": "null"}));
//!
//! let logger = LoggerFactory::new(config).make(None)?;
//! logger.info("User {user} signed in", LogContext::new().with_field("user", "john"))?;
//! # Ok::<(), channel_logger::LoggerError>(())
//! ```

pub mod core;
pub mod formatters;
pub mod macros;
pub mod processors;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        BufferLogger, ChannelLogger, Environment, FieldValue, LogContext, LogLevel, LogRecord,
        LoggedError, Logger, LoggerError, LoggerFactory, LoggingConfig, Result, Sink, StackLogger,
        TimestampFormat,
    };
    pub use crate::formatters::{Formatter, JsonFormatter, LineFormatter};
    pub use crate::processors::{
        IntrospectionProcessor, MemoryUsageProcessor, Processor, ProcessorRegistry, UidProcessor,
    };
}

pub use crate::core::{
    BufferLogger, ChannelLogger, Environment, FieldValue, LogContext, LogLevel, LogRecord,
    LoggedError, Logger, LoggerError, LoggerFactory, LoggingConfig, Result, StackLogger,
    TimestampFormat,
};
pub use formatters::{Formatter, JsonFormatter, LineFormatter};
pub use processors::{Processor, ProcessorRegistry};
