//! Physical sink implementations

pub mod console;
pub mod file;
pub mod memory;
pub mod native;
pub mod null;
pub mod syslog;

pub use console::ConsoleSink;
pub use file::FileSink;
pub use memory::{MemorySink, SharedBuffer};
pub use native::{MessageType, NativeSink};
pub use null::NullSink;
pub use syslog::SyslogSink;

pub use crate::core::Sink;
