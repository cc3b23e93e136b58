//! In-memory sinks for embedding and inspection

use crate::core::{LogLevel, Result, Sink};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// Collects formatted lines in memory; clones share the same storage.
///
/// ```
/// use channel_logger::core::{Environment, Logger, ChannelLogger, LogContext};
/// use channel_logger::sinks::MemorySink;
///
/// let sink = MemorySink::new();
/// let logger = ChannelLogger::new("app", Environment::new("dev"), sink.clone());
/// logger.info("ready", LogContext::new()).unwrap();
/// assert_eq!(sink.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<(LogLevel, String)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().iter().map(|(_, l)| l.clone()).collect()
    }

    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.lines.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl Sink for MemorySink {
    fn write(&mut self, level: LogLevel, line: &str) -> Result<()> {
        self.lines.lock().push((level, line.to_string()));
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// A cloneable `io::Write` target backed by a shared byte buffer
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
