//! Sink trait for physical log destinations

use super::{error::Result, log_level::LogLevel};

/// Receives fully formatted lines from a logger's pipeline.
///
/// `level` is the record's final level (processors may have rewritten it);
/// sinks use it for stream routing or priorities, never for filtering.
pub trait Sink: Send {
    fn write(&mut self, level: LogLevel, line: &str) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}
