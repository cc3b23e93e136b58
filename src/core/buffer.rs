//! Buffering decorator deferring records until flushed

use super::{error::Result, log_context::LogContext, log_level::LogLevel, logger::Logger};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

struct Pending {
    level: LogLevel,
    message: String,
    context: LogContext,
}

/// Holds records in memory and forwards them to `inner` on flush.
///
/// Emergencies are never buffered: they flush the queue and are delivered
/// right away. With a positive limit and `flush_on_overflow`, reaching the
/// limit flushes the whole queue. Dropping the logger flushes whatever is
/// still pending.
///
/// Typical for workers and batch jobs that want one burst of I/O per unit of
/// work.
pub struct BufferLogger {
    channel: String,
    inner: Arc<dyn Logger>,
    limit: usize,
    flush_on_overflow: bool,
    queue: Mutex<Vec<Pending>>,
}

impl BufferLogger {
    /// `limit` of 0 means unbounded
    pub fn new(inner: Arc<dyn Logger>, limit: usize, flush_on_overflow: bool) -> Self {
        Self {
            channel: inner.channel().to_string(),
            inner,
            limit,
            flush_on_overflow,
            queue: Mutex::new(Vec::new()),
        }
    }

    pub fn unbounded(inner: Arc<dyn Logger>) -> Self {
        Self::new(inner, 0, true)
    }

    /// Name the buffer answers to; defaults to the inner logger's channel
    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    pub fn inner(&self) -> &Arc<dyn Logger> {
        &self.inner
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of records waiting to be flushed
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Discard pending records without forwarding them
    pub fn clear(&self) {
        self.queue.lock().clear();
    }

    fn push(&self, level: LogLevel, message: &str, context: LogContext) -> Result<()> {
        let overflowing = {
            let mut queue = self.queue.lock();
            queue.push(Pending {
                level,
                message: message.to_string(),
                context,
            });
            self.flush_on_overflow && self.limit > 0 && queue.len() >= self.limit
        };

        if overflowing {
            self.flush()?;
        }
        Ok(())
    }
}

impl Logger for BufferLogger {
    fn channel(&self) -> &str {
        &self.channel
    }

    fn log(&self, level: LogLevel, message: &str, context: LogContext) -> Result<()> {
        if level == LogLevel::Emergency {
            self.flush()?;
            return self.inner.log(level, message, context);
        }
        self.push(level, message, context)
    }

    /// The level depends on the inner logger's environment, so this is
    /// delivered immediately
    fn smart_log(&self, message: &str, context: LogContext) -> Result<()> {
        self.inner.smart_log(message, context)
    }

    /// Forward pending records in arrival order. The queue is emptied even if
    /// the inner logger fails; the first failure is returned.
    fn flush(&self) -> Result<()> {
        let pending = std::mem::take(&mut *self.queue.lock());

        let mut first_error = None;
        for record in pending {
            if let Err(e) = self.inner.log(record.level, &record.message, record.context) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl Drop for BufferLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush buffered records on drop: {}", e);
        }
    }
}

impl fmt::Debug for BufferLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferLogger")
            .field("channel", &self.channel)
            .field("limit", &self.limit)
            .field("flush_on_overflow", &self.flush_on_overflow)
            .field("pending", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ChannelLogger, Environment};
    use crate::formatters::LineFormatter;
    use crate::sinks::MemorySink;

    fn inner(sink: &MemorySink) -> Arc<dyn Logger> {
        Arc::new(
            ChannelLogger::new("worker", Environment::default(), sink.clone())
                .with_formatter(LineFormatter::with_format("{level} {message}")),
        )
    }

    #[test]
    fn test_limit_triggers_flush() {
        let sink = MemorySink::new();
        let buffer = BufferLogger::new(inner(&sink), 3, true);

        buffer.info("one", LogContext::new()).unwrap();
        buffer.debug("two", LogContext::new()).unwrap();
        assert!(sink.is_empty());
        assert_eq!(buffer.len(), 2);

        buffer.warning("three", LogContext::new()).unwrap();
        assert_eq!(sink.lines(), vec!["INFO one", "DEBUG two", "WARNING three"]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_emergency_flushes_then_forwards() {
        let sink = MemorySink::new();
        let buffer = BufferLogger::new(inner(&sink), 3, true);

        buffer.info("one", LogContext::new()).unwrap();
        buffer.error("two", LogContext::new()).unwrap();
        buffer.emergency("down", LogContext::new()).unwrap();

        assert_eq!(sink.lines(), vec!["INFO one", "ERROR two", "EMERGENCY down"]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_no_auto_flush_without_overflow_flag() {
        let sink = MemorySink::new();
        let buffer = BufferLogger::new(inner(&sink), 2, false);

        for i in 0..5 {
            buffer.info(&format!("m{}", i), LogContext::new()).unwrap();
        }
        assert!(sink.is_empty());
        assert_eq!(buffer.len(), 5);

        buffer.flush().unwrap();
        assert_eq!(sink.len(), 5);
    }

    #[test]
    fn test_clear_discards() {
        let sink = MemorySink::new();
        let buffer = BufferLogger::unbounded(inner(&sink));

        buffer.alert("gone", LogContext::new()).unwrap();
        buffer.clear();
        buffer.flush().unwrap();
        drop(buffer);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_drop_flushes() {
        let sink = MemorySink::new();
        {
            let buffer = BufferLogger::unbounded(inner(&sink));
            buffer.notice("pending", LogContext::new()).unwrap();
            assert!(sink.is_empty());
        }
        assert_eq!(sink.lines(), vec!["NOTICE pending"]);
    }

    #[test]
    fn test_smart_log_is_not_buffered() {
        let sink = MemorySink::new();
        let buffer = BufferLogger::unbounded(inner(&sink));

        buffer.smart_log("now", LogContext::new()).unwrap();
        assert_eq!(sink.len(), 1);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_channel_is_inner_channel() {
        let sink = MemorySink::new();
        assert_eq!(BufferLogger::unbounded(inner(&sink)).channel(), "worker");
        let named = BufferLogger::unbounded(inner(&sink)).with_channel("batched");
        assert_eq!(named.channel(), "batched");
    }
}
