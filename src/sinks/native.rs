//! Native error-log sink implementation

use crate::core::{LogLevel, LoggerError, Result, Sink};
use std::fs::OpenOptions;
use std::io::{self, Write};

/// Where the native error log delivers a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageType {
    /// The process's system logger (stderr)
    #[default]
    System = 0,
    /// Mail to the destination address
    Mail = 1,
    /// Append to the destination file
    File = 3,
    /// Directly to the server API's logger (stderr)
    Sapi = 4,
}

impl MessageType {
    /// Map a configured code; anything outside 0, 1, 3, 4 becomes `System`
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => MessageType::Mail,
            3 => MessageType::File,
            4 => MessageType::Sapi,
            _ => MessageType::System,
        }
    }
}

/// Mirrors the platform error-log primitive: a message type plus an
/// optional destination.
///
/// There is no mail transport, so `Mail` messages land on the system
/// stream tagged with their recipient.
pub struct NativeSink {
    message_type: MessageType,
    destination: Option<String>,
    stream: Box<dyn Write + Send>,
}

impl NativeSink {
    pub fn new(message_type: MessageType, destination: Option<String>) -> Self {
        Self {
            message_type,
            destination,
            stream: Box::new(io::stderr()),
        }
    }

    /// Replace the system stream used by `System`, `Sapi` and `Mail`
    pub fn with_stream(mut self, stream: impl Write + Send + 'static) -> Self {
        self.stream = Box::new(stream);
        self
    }

    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    fn append_to_destination(&self, line: &str) -> Result<()> {
        let destination = self.destination.as_deref().ok_or_else(|| {
            LoggerError::sink("errorlog", "message type 3 requires a destination file")
        })?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(destination)
            .map_err(|e| {
                LoggerError::io_operation(
                    format!("opening '{}'", destination),
                    "cannot open error log destination",
                    e,
                )
            })?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

impl Sink for NativeSink {
    fn write(&mut self, _level: LogLevel, line: &str) -> Result<()> {
        match self.message_type {
            MessageType::File => self.append_to_destination(line),
            MessageType::Mail => {
                let to = self.destination.as_deref().unwrap_or("unknown recipient");
                writeln!(self.stream, "[mail to {}] {}", to, line)?;
                Ok(())
            }
            MessageType::System | MessageType::Sapi => {
                writeln!(self.stream, "{}", line)?;
                Ok(())
            }
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.stream.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "errorlog"
    }
}
