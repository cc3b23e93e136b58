//! Sink that discards everything

use crate::core::{LogLevel, Result, Sink};

#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl Sink for NullSink {
    fn write(&mut self, _level: LogLevel, _line: &str) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}
