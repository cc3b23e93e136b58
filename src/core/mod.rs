//! Core logger types, the logger pipeline and the factory building it

pub mod buffer;
pub mod call_stack;
pub mod config;
pub mod error;
pub mod factory;
pub mod log_context;
pub mod log_level;
pub mod log_record;
pub mod logged_error;
pub mod logger;
pub mod sink;
pub mod stack;
pub mod timestamp;

pub use buffer::BufferLogger;
pub use config::{ChannelConfig, Driver, LoggingConfig, DEFAULT_CHANNEL, DEFAULT_ENV};
pub use error::{LoggerError, Result};
pub use factory::{LoggerFactory, ResolutionContext};
pub use log_context::{FieldValue, LogContext};
pub use log_level::LogLevel;
pub use log_record::{Environment, LogRecord, ENV_KEY};
pub use logged_error::{LoggedError, EXCEPTION_KEY, MAX_TRACE_FRAMES};
pub use logger::{ChannelLogger, Logger};
pub use sink::Sink;
pub use stack::{MemberKey, StackLogger, StackMember};
pub use timestamp::TimestampFormat;
