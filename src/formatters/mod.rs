//! Formatters turn a finished record into the text a sink receives

pub mod json;
pub mod line;

pub use json::JsonFormatter;
pub use line::{LineFormatter, DEFAULT_LINE_FORMAT};

use crate::core::{Environment, LogRecord};

/// Stateless rendering strategy shared by every concrete logger
pub trait Formatter: Send + Sync {
    fn format(&self, record: &LogRecord, env: &Environment) -> String;
}
