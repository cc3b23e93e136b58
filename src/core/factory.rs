//! Builds live logger graphs from configuration

use super::{
    buffer::BufferLogger,
    config::{ChannelConfig, Driver, LoggingConfig},
    error::{LoggerError, Result},
    log_record::Environment,
    logger::{ChannelLogger, Logger},
    sink::Sink,
    stack::StackLogger,
    timestamp::{format_custom, TimestampFormat},
};
use crate::formatters::{Formatter, JsonFormatter, LineFormatter};
use crate::processors::{Processor, ProcessorRegistry};
use crate::sinks::{ConsoleSink, FileSink, MessageType, NativeSink, NullSink, SyslogSink};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DEFAULT_FILE_PATH: &str = "logs/app.log";
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_SYSLOG_IDENT: &str = "app";

/// Template of the `file` driver
pub const FILE_LINE_FORMAT: &str = "[{timestamp}] [{env}] {level}: {message} {context}";

/// Template of the `console`, `syslog` and `errorlog` drivers
pub const STREAM_LINE_FORMAT: &str = "[{env}] {level}: {message} {context}";

/// Channels currently being built in one resolution chain, outermost first
#[derive(Debug, Clone, Default)]
pub struct ResolutionContext {
    resolving: Vec<String>,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ancestry(ancestry: &[String]) -> Self {
        Self {
            resolving: ancestry.to_vec(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolving.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.resolving
    }

    fn push(&mut self, name: &str) {
        self.resolving.push(name.to_string());
    }

    fn pop(&mut self) {
        self.resolving.pop();
    }
}

struct FactoryInner {
    config: LoggingConfig,
    env: Environment,
    processors: ProcessorRegistry,
}

/// Turns channel names into loggers.
///
/// The factory holds no mutable state: every `make` call builds a fresh
/// logger graph, and clones share the same configuration.
///
/// ```
/// use channel_logger::core::{LogContext, LoggerFactory, LoggingConfig};
/// use serde_json::json;
///
/// let factory = LoggerFactory::new(
///     LoggingConfig::new()
///         .channel("stack", json!({"driver": "stack", "channels": ["quiet"]}))
///         .channel("quiet", json!({"driver": "null"})),
/// );
///
/// let logger = factory.make(None).unwrap();
/// logger.info("nobody hears this", LogContext::new()).unwrap();
/// ```
#[derive(Clone)]
pub struct LoggerFactory {
    inner: Arc<FactoryInner>,
}

impl LoggerFactory {
    pub fn new(config: LoggingConfig) -> Self {
        Self::with_registry(config, ProcessorRegistry::with_defaults())
    }

    /// Factory resolving processor identifiers through `processors`
    pub fn with_registry(config: LoggingConfig, processors: ProcessorRegistry) -> Self {
        let env = config.environment();
        Self {
            inner: Arc::new(FactoryInner {
                config,
                env,
                processors,
            }),
        }
    }

    pub fn config(&self) -> &LoggingConfig {
        &self.inner.config
    }

    pub fn environment(&self) -> &Environment {
        &self.inner.env
    }

    /// Build the logger for `channel`, or for the default channel.
    ///
    /// Fails when the channel (or a buffer handler it needs) is not
    /// configured, names an unknown driver, or is part of a reference cycle
    /// through stack members or buffer handlers.
    pub fn make(&self, channel: Option<&str>) -> Result<Arc<dyn Logger>> {
        let name = channel.unwrap_or_else(|| self.config().default_channel_name());
        self.check_acyclic(name)?;
        self.resolve(name, &mut ResolutionContext::new())
    }

    /// Build `channel` on behalf of a logger that is itself being built by
    /// the channels in `ancestry`
    pub fn make_within(&self, channel: &str, ancestry: &[String]) -> Result<Arc<dyn Logger>> {
        self.resolve(channel, &mut ResolutionContext::from_ancestry(ancestry))
    }

    fn resolve(&self, name: &str, ctx: &mut ResolutionContext) -> Result<Arc<dyn Logger>> {
        if ctx.contains(name) {
            return Err(LoggerError::cycle(name));
        }
        let value = self
            .config()
            .channel_value(name)
            .ok_or_else(|| LoggerError::not_configured(name))?;

        ctx.push(name);
        let result = self.build(name, value, ctx);
        ctx.pop();
        result
    }

    fn build(&self, name: &str, value: &Value, ctx: &mut ResolutionContext) -> Result<Arc<dyn Logger>> {
        let channel = ChannelConfig::new(name, value)?;

        match channel.driver()? {
            Driver::Stack => self.build_stack(&channel, ctx),
            Driver::Buffer => self.build_buffer(&channel, ctx),
            Driver::File => {
                let path = file_path(&channel, &Utc::now());
                ensure_parent_dir(&path)?;
                Ok(self.concrete(&channel, Box::new(FileSink::new(path)), FILE_LINE_FORMAT))
            }
            Driver::Console => {
                let sink = ConsoleSink::with_colors(channel.bool_or("colorize", true));
                Ok(self.concrete(&channel, Box::new(sink), STREAM_LINE_FORMAT))
            }
            Driver::Syslog => {
                let ident = channel.str_or("ident", DEFAULT_SYSLOG_IDENT);
                let facility = channel.int_or("facility", i64::from(crate::sinks::syslog::DEFAULT_FACILITY));
                let facility = i32::try_from(facility)
                    .ok()
                    .filter(|code| crate::sinks::syslog::facility(*code).is_some())
                    .ok_or_else(|| {
                        LoggerError::invalid_config(name, format!("unknown syslog facility {}", facility))
                    })?;
                let mut sink = SyslogSink::new(&ident, facility)?;
                if let Some(socket) = channel.opt_str("socket") {
                    sink = sink.with_socket(socket);
                }
                Ok(self.concrete(&channel, Box::new(sink), STREAM_LINE_FORMAT))
            }
            Driver::ErrorLog => {
                let sink = NativeSink::new(
                    MessageType::from_code(channel.int_or("message_type", 0)),
                    channel.opt_str("destination").map(str::to_string),
                );
                Ok(self.concrete(&channel, Box::new(sink), STREAM_LINE_FORMAT))
            }
            Driver::Null => Ok(self.concrete(&channel, Box::new(NullSink), STREAM_LINE_FORMAT)),
        }
    }

    fn build_stack(&self, channel: &ChannelConfig<'_>, ctx: &ResolutionContext) -> Result<Arc<dyn Logger>> {
        let members = channel.string_list("channels");
        if let Some(member) = members.iter().find(|m| ctx.contains(m)) {
            return Err(LoggerError::cycle(member.as_str()));
        }

        Ok(Arc::new(StackLogger::with_members(
            channel.display_name(),
            members,
            self.clone(),
            ctx.names().to_vec(),
        )))
    }

    fn build_buffer(&self, channel: &ChannelConfig<'_>, ctx: &mut ResolutionContext) -> Result<Arc<dyn Logger>> {
        let handler = channel.opt_str("handler").ok_or_else(|| {
            LoggerError::invalid_config(channel.name(), "buffer driver needs a 'handler' channel")
        })?;
        let inner = self.resolve(handler, ctx)?;

        let limit = usize::try_from(channel.int_or("buffer_limit", 0)).unwrap_or(0);
        let buffer = BufferLogger::new(inner, limit, channel.bool_or("flush_on_overflow", true))
            .with_channel(channel.display_name());
        Ok(Arc::new(buffer))
    }

    fn concrete(&self, channel: &ChannelConfig<'_>, sink: Box<dyn Sink>, default_format: &str) -> Arc<dyn Logger> {
        let logger = ChannelLogger::with_sink(channel.display_name(), self.environment().clone(), sink)
            .with_min_level(channel.level())
            .with_boxed_formatter(self.formatter(channel, default_format))
            .with_processors(self.processors(channel));
        Arc::new(logger)
    }

    fn formatter(&self, channel: &ChannelConfig<'_>, default_format: &str) -> Box<dyn Formatter> {
        let timestamp_format = channel
            .opt_str("timestamp_format")
            .map(TimestampFormat::from_config)
            .unwrap_or_default();
        let line = || -> Box<dyn Formatter> {
            Box::new(
                LineFormatter::with_format(channel.str_or("format", default_format))
                    .with_timestamp_format(timestamp_format.clone()),
            )
        };

        match channel.opt_str("formatter").map(str::to_lowercase).as_deref() {
            None | Some("line") => line(),
            Some("json") => {
                let json = if channel.bool_or("pretty", false) {
                    JsonFormatter::new_pretty()
                } else {
                    JsonFormatter::new()
                };
                Box::new(json.with_timestamp_format(timestamp_format.clone()))
            }
            Some(other) => {
                eprintln!(
                    "[LOGGER WARNING] Unknown formatter '{}' for channel '{}', using line",
                    other,
                    channel.name()
                );
                line()
            }
        }
    }

    fn processors(&self, channel: &ChannelConfig<'_>) -> Vec<Arc<dyn Processor>> {
        channel
            .list("processors")
            .iter()
            .filter_map(|entry| {
                let processor = self.inner.processors.resolve(entry);
                if processor.is_none() {
                    eprintln!(
                        "[LOGGER WARNING] Skipping unknown processor {} for channel '{}'",
                        entry,
                        channel.name()
                    );
                }
                processor
            })
            .collect()
    }

    /// Walk stack members and buffer handlers from `root`, failing on the
    /// first channel reached twice along one path
    fn check_acyclic(&self, root: &str) -> Result<()> {
        let mut path = Vec::new();
        let mut done = HashSet::new();
        self.visit(root, &mut path, &mut done)
    }

    fn visit(&self, name: &str, path: &mut Vec<String>, done: &mut HashSet<String>) -> Result<()> {
        if path.iter().any(|n| n == name) {
            return Err(LoggerError::cycle(name));
        }
        if done.contains(name) {
            return Ok(());
        }

        path.push(name.to_string());
        let result = self
            .references(name)
            .iter()
            .try_for_each(|next| self.visit(next, path, done));
        path.pop();
        result?;

        done.insert(name.to_string());
        Ok(())
    }

    /// Channels `name` refers to; malformed entries refer to nothing here and
    /// fail later when they are built
    fn references(&self, name: &str) -> Vec<String> {
        let Some(channel) = self
            .config()
            .channel_value(name)
            .and_then(|value| ChannelConfig::new(name, value).ok())
        else {
            return Vec::new();
        };

        match channel.driver() {
            Ok(Driver::Stack) => channel.string_list("channels"),
            Ok(Driver::Buffer) => channel.opt_str("handler").map(str::to_string).into_iter().collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Debug for LoggerFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut channels: Vec<&String> = self.config().channels.keys().collect();
        channels.sort();
        f.debug_struct("LoggerFactory")
            .field("default", &self.config().default_channel_name())
            .field("env", &self.environment())
            .field("channels", &channels)
            .finish()
    }
}

/// Log file path for a `file` channel at `now`.
///
/// `{date}` is replaced by `now` in `date_format`; with `daily` a path
/// without the placeholder gets `-{date}` inserted before its extension.
pub fn file_path(channel: &ChannelConfig<'_>, now: &DateTime<Utc>) -> PathBuf {
    let mut path = channel.str_or("path", DEFAULT_FILE_PATH);

    if channel.bool_or("daily", false) && !path.contains("{date}") {
        path = with_date_suffix(&path);
    }

    if path.contains("{date}") {
        let date_format = channel.str_or("date_format", DEFAULT_DATE_FORMAT);
        let date = format_custom(now, &date_format)
            .unwrap_or_else(|| now.format(DEFAULT_DATE_FORMAT).to_string());
        path = path.replace("{date}", &date);
    }

    PathBuf::from(path)
}

/// `logs/app.log` → `logs/app-{date}.log`
fn with_date_suffix(path: &str) -> String {
    let path = Path::new(path);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match path.extension() {
        Some(ext) => format!("{}-{{date}}.{}", stem, ext.to_string_lossy()),
        None => format!("{}-{{date}}", stem),
    };
    path.with_file_name(file_name).to_string_lossy().into_owned()
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => fs::create_dir_all(dir)
            .map_err(|e| LoggerError::io_operation("creating log directory", dir.display().to_string(), e)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn factory(config: LoggingConfig) -> LoggerFactory {
        LoggerFactory::new(config)
    }

    #[test]
    fn test_not_configured_names_channel() {
        let err = factory(LoggingConfig::new()).make(Some("missing")).unwrap_err();
        assert!(matches!(err, LoggerError::ChannelNotConfigured { .. }));
        assert_eq!(err.channel(), Some("missing"));
    }

    #[test]
    fn test_default_channel_must_exist() {
        let err = factory(LoggingConfig::new()).make(None).unwrap_err();
        assert_eq!(err.channel(), Some("stack"));
    }

    #[test]
    fn test_unsupported_driver() {
        let config = LoggingConfig::new().channel("weird", json!({"driver": "kafka"}));
        let err = factory(config).make(Some("weird")).unwrap_err();
        assert!(matches!(err, LoggerError::UnsupportedDriver { .. }));
        assert_eq!(err.channel(), Some("weird"));
    }

    #[test]
    fn test_non_mapping_channel() {
        let config = LoggingConfig::new().channel("bad", json!(["file"]));
        let err = factory(config).make(Some("bad")).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidChannelConfig { .. }));
    }

    #[test]
    fn test_self_referencing_stack() {
        let config = LoggingConfig::new().channel("loop", json!({"driver": "stack", "channels": ["loop"]}));
        let err = factory(config).make(Some("loop")).unwrap_err();
        assert!(err.is_cycle());
        assert_eq!(err.channel(), Some("loop"));
    }

    #[test]
    fn test_indirect_cycle_fails_make() {
        let config = LoggingConfig::new()
            .channel("a", json!({"driver": "stack", "channels": ["b"]}))
            .channel("b", json!({"driver": "stack", "channels": ["c"]}))
            .channel("c", json!({"driver": "stack", "channels": ["a"]}))
            .channel("plain", json!({"driver": "null"}));
        let factory = factory(config);

        assert!(factory.make(Some("a")).unwrap_err().is_cycle());
        assert!(factory.make(Some("b")).unwrap_err().is_cycle());
        assert!(factory.make(Some("plain")).is_ok());
    }

    #[test]
    fn test_buffer_handler_cycle() {
        let config = LoggingConfig::new()
            .channel("buf", json!({"driver": "buffer", "handler": "stack"}))
            .channel("stack", json!({"driver": "stack", "channels": ["buf"]}));
        assert!(factory(config).make(Some("buf")).unwrap_err().is_cycle());
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let config = LoggingConfig::new()
            .channel("top", json!({"driver": "stack", "channels": ["left", "right"]}))
            .channel("left", json!({"driver": "stack", "channels": ["leaf"]}))
            .channel("right", json!({"driver": "stack", "channels": ["leaf"]}))
            .channel("leaf", json!({"driver": "null"}));
        assert!(factory(config).make(Some("top")).is_ok());
    }

    #[test]
    fn test_resolution_context_is_per_call() {
        let config = LoggingConfig::new().channel("quiet", json!({"driver": "null"}));
        let factory = factory(config);
        // A failed make leaves nothing behind for the next one
        assert!(factory.make(Some("nope")).is_err());
        assert!(factory.make(Some("quiet")).is_ok());
        assert!(factory.make(Some("quiet")).is_ok());
    }

    #[test]
    fn test_make_within_detects_reentry() {
        let config = LoggingConfig::new().channel("quiet", json!({"driver": "null"}));
        let err = factory(config)
            .make_within("quiet", &["outer".to_string(), "quiet".to_string()])
            .unwrap_err();
        assert!(err.is_cycle());
    }

    #[test]
    fn test_buffer_requires_handler() {
        let config = LoggingConfig::new().channel("buf", json!({"driver": "buffer"}));
        let err = factory(config).make(Some("buf")).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidChannelConfig { .. }));
    }

    #[test]
    fn test_display_name() {
        let config = LoggingConfig::new().channel("quiet", json!({"driver": "null", "channel": "audit"}));
        assert_eq!(factory(config).make(Some("quiet")).unwrap().channel(), "audit");
    }

    #[test]
    fn test_file_path_expansion() {
        let now = Utc.with_ymd_and_hms(2025, 3, 9, 12, 0, 0).unwrap();

        let value = json!({"path": "logs/app-{date}.log"});
        let channel = ChannelConfig::new("daily", &value).unwrap();
        assert_eq!(file_path(&channel, &now), PathBuf::from("logs/app-2025-03-09.log"));

        let value = json!({"path": "logs/app.log", "daily": true});
        let channel = ChannelConfig::new("daily", &value).unwrap();
        assert_eq!(file_path(&channel, &now), PathBuf::from("logs/app-2025-03-09.log"));

        let value = json!({"path": "app", "daily": true, "date_format": "%Y%m%d"});
        let channel = ChannelConfig::new("daily", &value).unwrap();
        assert_eq!(file_path(&channel, &now), PathBuf::from("app-20250309"));

        let value = json!({});
        let channel = ChannelConfig::new("single", &value).unwrap();
        assert_eq!(file_path(&channel, &now), PathBuf::from(DEFAULT_FILE_PATH));
    }
}
