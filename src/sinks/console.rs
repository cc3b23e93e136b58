//! Console sink implementation

use crate::core::{LogLevel, LoggerError, Result, Sink};
use colored::Colorize;
use std::io::{self, Write};

/// Writes lines to the terminal, error-and-above to the error stream.
pub struct ConsoleSink {
    use_colors: bool,
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::with_colors(true)
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            out: Box::new(io::stdout()),
            err: Box::new(io::stderr()),
        }
    }

    /// Redirect both streams, e.g. into buffers for inspection
    ///
    /// ```
    /// use channel_logger::sinks::{ConsoleSink, SharedBuffer};
    ///
    /// let out = SharedBuffer::new();
    /// let err = SharedBuffer::new();
    /// let sink = ConsoleSink::with_writers(false, out.clone(), err.clone());
    /// ```
    pub fn with_writers(
        use_colors: bool,
        out: impl Write + Send + 'static,
        err: impl Write + Send + 'static,
    ) -> Self {
        Self {
            use_colors,
            out: Box::new(out),
            err: Box::new(err),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn write(&mut self, level: LogLevel, line: &str) -> Result<()> {
        let output = if self.use_colors {
            line.color(level.color_code()).to_string()
        } else {
            line.to_string()
        };

        // Route Error and above to stderr, others to stdout
        let stream = if level.is_error() {
            &mut self.err
        } else {
            &mut self.out
        };
        writeln!(stream, "{}", output).map_err(|e| {
            LoggerError::io_operation("writing to console", "stream rejected log line", e)
        })
    }

    fn flush(&mut self) -> Result<()> {
        // Flush both streams since we write to both
        self.out.flush()?;
        self.err.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
