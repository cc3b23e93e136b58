//! Logger contract and the per-record pipeline shared by concrete loggers

use super::{
    error::Result,
    log_context::{FieldValue, LogContext},
    log_level::LogLevel,
    log_record::{Environment, LogRecord, ENV_KEY},
    logged_error::EXCEPTION_KEY,
    sink::Sink,
    stack::StackMember,
};
use crate::formatters::{Formatter, LineFormatter};
use crate::processors::Processor;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// A named destination for log records.
///
/// Every method takes `&self` so loggers can be shared as `Arc<dyn Logger>`
/// across stacks, buffers and threads.
pub trait Logger: Send + Sync {
    /// Channel name records are tagged with
    fn channel(&self) -> &str;

    fn log(&self, level: LogLevel, message: &str, context: LogContext) -> Result<()>;

    /// Log under a textual level; unknown names fall back to debug
    fn log_named(&self, level: &str, message: &str, context: LogContext) -> Result<()> {
        self.log(LogLevel::normalize(level), message, context)
    }

    /// Log at the level implied by the logger's environment
    fn smart_log(&self, message: &str, context: LogContext) -> Result<()>;

    fn emergency(&self, message: &str, context: LogContext) -> Result<()> {
        self.log(LogLevel::Emergency, message, context)
    }

    fn alert(&self, message: &str, context: LogContext) -> Result<()> {
        self.log(LogLevel::Alert, message, context)
    }

    fn critical(&self, message: &str, context: LogContext) -> Result<()> {
        self.log(LogLevel::Critical, message, context)
    }

    fn error(&self, message: &str, context: LogContext) -> Result<()> {
        self.log(LogLevel::Error, message, context)
    }

    fn warning(&self, message: &str, context: LogContext) -> Result<()> {
        self.log(LogLevel::Warning, message, context)
    }

    fn notice(&self, message: &str, context: LogContext) -> Result<()> {
        self.log(LogLevel::Notice, message, context)
    }

    fn info(&self, message: &str, context: LogContext) -> Result<()> {
        self.log(LogLevel::Info, message, context)
    }

    fn debug(&self, message: &str, context: LogContext) -> Result<()> {
        self.log(LogLevel::Debug, message, context)
    }

    /// Push anything held back (buffers, sink write buffers) downstream
    fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Members of a fan-out logger, `None` for everything else.
    ///
    /// Stacks use this to flatten nested stacks into their own member list.
    fn nested_members(&self) -> Option<Result<Vec<StackMember>>> {
        None
    }
}

/// Concrete logger: level filter, enrichment, processors, formatter, sink.
///
/// # Example
///
/// ```
/// use channel_logger::core::{ChannelLogger, Environment, LogContext, LogLevel, Logger};
/// use channel_logger::sinks::MemorySink;
///
/// let sink = MemorySink::new();
/// let logger = ChannelLogger::new("app", Environment::new("dev"), sink.clone())
///     .with_min_level(LogLevel::Info);
///
/// logger.debug("dropped", LogContext::new()).unwrap();
/// logger.info("kept", LogContext::new()).unwrap();
/// assert_eq!(sink.len(), 1);
/// ```
pub struct ChannelLogger {
    channel: String,
    env: Environment,
    min_level: LogLevel,
    formatter: Box<dyn Formatter>,
    processors: Vec<Arc<dyn Processor>>,
    sink: Mutex<Box<dyn Sink>>,
}

impl ChannelLogger {
    pub fn new(channel: impl Into<String>, env: Environment, sink: impl Sink + 'static) -> Self {
        Self::with_sink(channel, env, Box::new(sink))
    }

    pub fn with_sink(channel: impl Into<String>, env: Environment, sink: Box<dyn Sink>) -> Self {
        Self {
            channel: channel.into(),
            env,
            min_level: LogLevel::Debug,
            formatter: Box::new(LineFormatter::new()),
            processors: Vec::new(),
            sink: Mutex::new(sink),
        }
    }

    #[must_use]
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: impl Formatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    #[must_use]
    pub fn with_boxed_formatter(mut self, formatter: Box<dyn Formatter>) -> Self {
        self.formatter = formatter;
        self
    }

    /// Append a processor; processors run in the order they were added
    #[must_use]
    pub fn with_processor(mut self, processor: Arc<dyn Processor>) -> Self {
        self.processors.push(processor);
        self
    }

    #[must_use]
    pub fn with_processors(mut self, processors: Vec<Arc<dyn Processor>>) -> Self {
        self.processors.extend(processors);
        self
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn sink_name(&self) -> String {
        self.sink.lock().name().to_string()
    }

    fn enrich(&self, context: LogContext) -> LogContext {
        let mut context = context.with_default_first(ENV_KEY, self.env.as_str());
        let normalized = match context.get(EXCEPTION_KEY) {
            Some(FieldValue::Error(err)) => Some(err.normalized()),
            _ => None,
        };
        if let Some(exception) = normalized {
            context.add_field(EXCEPTION_KEY, FieldValue::Json(exception));
        }
        context
    }
}

impl Logger for ChannelLogger {
    fn channel(&self) -> &str {
        &self.channel
    }

    fn log(&self, level: LogLevel, message: &str, context: LogContext) -> Result<()> {
        if level < self.min_level {
            return Ok(());
        }

        let record = LogRecord::new(level, message, self.channel.as_str())
            .with_context(self.enrich(context));
        let record = self
            .processors
            .iter()
            .fold(record, |record, processor| processor.process(record));

        let line = self.formatter.format(&record, &self.env);
        self.sink.lock().write(record.level, &line)
    }

    fn smart_log(&self, message: &str, context: LogContext) -> Result<()> {
        self.log(self.env.smart_level(), message, context)
    }

    fn flush(&self) -> Result<()> {
        self.sink.lock().flush()
    }
}

impl fmt::Debug for dyn Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("channel", &self.channel())
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for ChannelLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelLogger")
            .field("channel", &self.channel)
            .field("env", &self.env)
            .field("min_level", &self.min_level)
            .field("processors", &self.processors.len())
            .finish()
    }
}
