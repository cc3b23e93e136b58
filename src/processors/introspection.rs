//! Call-site introspection processor

use super::Processor;
use crate::core::call_stack::{self, Frame};
use crate::core::LogRecord;

/// Frames whose symbols start with one of these belong to the logging
/// machinery itself (or to the runtime underneath it).
const INTERNAL_PREFIXES: &[&str] = &[
    "channel_logger::",
    "std::",
    "core::",
    "alloc::",
    "backtrace::",
    "__rust",
    "rust_begin_unwind",
];

/// Adds `file`, `line` and `function` of the code that issued the log call.
///
/// The stack is walked from the innermost frame outwards; frames of this
/// crate, of the standard library, and of any `skip_prefixes` are passed
/// over, then `skip_frames` more are dropped for callers that wrap the logger
/// in helpers of their own.
#[derive(Debug, Clone, Default)]
pub struct IntrospectionProcessor {
    skip_frames: usize,
    skip_prefixes: Vec<String>,
}

impl IntrospectionProcessor {
    pub fn new(skip_frames: usize, skip_prefixes: Vec<String>) -> Self {
        Self {
            skip_frames,
            skip_prefixes,
        }
    }

    fn is_internal(&self, function: &str) -> bool {
        // Trait impls render as `<crate::Type as crate::Trait>::method`
        let symbol = function.trim_start_matches('<');
        INTERNAL_PREFIXES.iter().any(|p| symbol.starts_with(p))
            || self.skip_prefixes.iter().any(|p| symbol.starts_with(p.as_str()))
    }

    /// First external frame, after `skip_frames`
    fn caller<'a>(&self, frames: &'a [Frame]) -> Option<&'a Frame> {
        let first_external = frames.iter().position(|f| !self.is_internal(&f.function))?;
        frames.get(first_external + self.skip_frames)
    }
}

impl Processor for IntrospectionProcessor {
    fn process(&self, mut record: LogRecord) -> LogRecord {
        let frames = call_stack::force_capture();
        let caller = self.caller(&frames);

        let file = caller
            .and_then(|f| f.file.clone())
            .unwrap_or_else(|| "unknown".to_string());
        let line = caller.and_then(|f| f.line).unwrap_or(0);
        let function = caller.map(|f| f.function.clone()).unwrap_or_default();

        record.extra.add_field("file", file);
        record.extra.add_field("line", line);
        record.extra.add_field("function", function);
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(function: &str, file: &str, line: u32) -> Frame {
        Frame {
            function: function.to_string(),
            file: Some(file.to_string()),
            line: Some(line),
        }
    }

    fn stack() -> Vec<Frame> {
        vec![
            frame("std::backtrace::Backtrace::force_capture", "backtrace.rs", 1),
            frame("channel_logger::processors::introspection::IntrospectionProcessor::process", "introspection.rs", 2),
            frame(
                "<channel_logger::core::logger::ChannelLogger as channel_logger::core::logger::Logger>::log",
                "logger.rs",
                3,
            ),
            frame("myapp::http::log_helper", "src/http.rs", 40),
            frame("myapp::http::handle", "src/http.rs", 88),
            frame("myapp::main", "src/main.rs", 5),
        ]
    }

    #[test]
    fn test_first_external_frame() {
        let processor = IntrospectionProcessor::default();
        let frames = stack();
        let caller = processor.caller(&frames).unwrap();
        assert_eq!(caller.function, "myapp::http::log_helper");
        assert_eq!(caller.line, Some(40));
    }

    #[test]
    fn test_caller_prefixes_are_skipped() {
        let processor = IntrospectionProcessor::new(0, vec!["myapp::http::log_".to_string()]);
        let frames = stack();
        assert_eq!(processor.caller(&frames).unwrap().function, "myapp::http::handle");
    }

    #[test]
    fn test_skip_frames() {
        let processor = IntrospectionProcessor::new(2, Vec::new());
        let frames = stack();
        assert_eq!(processor.caller(&frames).unwrap().function, "myapp::main");

        let processor = IntrospectionProcessor::new(10, Vec::new());
        assert!(processor.caller(&frames).is_none());
    }

    #[test]
    fn test_fields_present_even_without_caller() {
        let processor = IntrospectionProcessor::new(1000, Vec::new());
        let record = processor.process(LogRecord::new(crate::core::LogLevel::Info, "x", "app"));
        assert!(record.extra.contains_key("file"));
        assert!(record.extra.contains_key("line"));
        assert!(record.extra.contains_key("function"));
    }
}
