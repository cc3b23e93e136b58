//! Structured error values carried in a record's `exception` slot

use super::call_stack;
use serde_json::{json, Map, Value};
use std::error::Error as StdError;
use std::panic::Location;

/// Context key the pipeline inspects for an error value
pub const EXCEPTION_KEY: &str = "exception";

/// Frames kept in a normalized trace, the overflow marker included
pub const MAX_TRACE_FRAMES: usize = 16;

/// An error captured for logging
///
/// Causes are owned (`previous` is a `Box`), so a chain is always finite and
/// normalization recurses without cycle tracking.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedError {
    pub class: String,
    pub message: String,
    pub code: i64,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub trace: Vec<String>,
    pub previous: Option<Box<LoggedError>>,
}

impl LoggedError {
    pub fn new(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            message: message.into(),
            code: 0,
            file: None,
            line: None,
            trace: Vec::new(),
            previous: None,
        }
    }

    /// Capture any error, its call site and its `source()` chain
    ///
    /// The frame list is filled only when `RUST_BACKTRACE` enables capture.
    ///
    /// ```
    /// use channel_logger::LoggedError;
    ///
    /// let err = "abc".parse::<i32>().unwrap_err();
    /// let captured = LoggedError::capture(&err);
    /// assert!(captured.class.ends_with("ParseIntError"));
    /// assert!(captured.file.is_some());
    /// ```
    #[track_caller]
    pub fn capture<E: StdError + 'static>(err: &E) -> Self {
        let location = Location::caller();
        let mut captured = Self::new(std::any::type_name::<E>(), err.to_string())
            .with_location(location.file(), location.line())
            .with_trace(call_stack::capture().iter().map(call_stack::Frame::describe));
        captured.previous = err.source().map(|src| Box::new(Self::from_source(src)));
        captured
    }

    fn from_source(err: &(dyn StdError + 'static)) -> Self {
        let mut captured = Self::new(class_hint(err), err.to_string());
        captured.previous = err.source().map(|src| Box::new(Self::from_source(src)));
        captured
    }

    #[must_use]
    pub fn with_code(mut self, code: i64) -> Self {
        self.code = code;
        self
    }

    #[must_use]
    pub fn with_location(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    #[must_use]
    pub fn with_trace<I, S>(mut self, frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trace = frames.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_previous(mut self, previous: LoggedError) -> Self {
        self.previous = Some(Box::new(previous));
        self
    }

    /// Structured description: class, message, code, file, trace, previous
    pub fn normalized(&self) -> Value {
        let mut object = Map::new();
        object.insert("class".into(), json!(self.class));
        object.insert("message".into(), json!(self.message));
        object.insert("code".into(), json!(self.code));
        object.insert("file".into(), json!(self.origin()));
        object.insert("trace".into(), Value::Array(self.bounded_trace()));
        if let Some(previous) = &self.previous {
            object.insert("previous".into(), previous.normalized());
        }
        Value::Object(object)
    }

    fn origin(&self) -> String {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => format!("{}:{}", file, line),
            (Some(file), None) => file.clone(),
            _ => String::new(),
        }
    }

    fn bounded_trace(&self) -> Vec<Value> {
        if self.trace.len() <= MAX_TRACE_FRAMES {
            return self.trace.iter().map(|f| json!(f)).collect();
        }

        let kept = MAX_TRACE_FRAMES - 1;
        let mut frames: Vec<Value> = self.trace[..kept].iter().map(|f| json!(f)).collect();
        frames.push(json!(format!("... {} more frames", self.trace.len() - kept)));
        frames
    }
}

/// Best-effort type name for a type-erased error: the leading identifier of
/// its `Debug` output (`ParseIntError { kind: .. }` gives `ParseIntError`).
fn class_hint(err: &dyn StdError) -> String {
    let debug = format!("{:?}", err);
    let name: String = debug
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == ':')
        .collect();
    if name.is_empty() {
        "Error".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Outer {
        inner: std::num::ParseIntError,
    }

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Controller failed")
        }
    }

    impl StdError for Outer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.inner)
        }
    }

    #[test]
    fn test_normalized_shape() {
        let err = LoggedError::new("RuntimeError", "Controller crashed")
            .with_code(500)
            .with_location("src/http.rs", 88)
            .with_previous(LoggedError::new("InvalidArgument", "Bad input").with_code(422));

        let value = err.normalized();
        assert_eq!(value["class"], "RuntimeError");
        assert_eq!(value["message"], "Controller crashed");
        assert_eq!(value["code"], 500);
        assert_eq!(value["file"], "src/http.rs:88");
        assert!(value["trace"].is_array());
        assert_eq!(value["previous"]["class"], "InvalidArgument");
        assert_eq!(value["previous"]["code"], 422);
        assert!(value["previous"].get("previous").is_none());
    }

    #[test]
    fn test_trace_is_capped() {
        let frames: Vec<String> = (0..40).map(|i| format!("frame {}", i)).collect();
        let err = LoggedError::new("E", "deep").with_trace(frames);

        let trace = err.normalized()["trace"].as_array().cloned().unwrap();
        assert_eq!(trace.len(), MAX_TRACE_FRAMES);
        assert_eq!(trace[0], "frame 0");
        assert_eq!(trace[MAX_TRACE_FRAMES - 1], "... 25 more frames");
    }

    #[test]
    fn test_short_trace_untouched() {
        let err = LoggedError::new("E", "shallow").with_trace(vec!["a", "b"]);
        assert_eq!(err.normalized()["trace"], json!(["a", "b"]));
    }

    #[test]
    fn test_capture_walks_sources() {
        let inner = "x".parse::<i32>().unwrap_err();
        let err = Outer { inner };

        let captured = LoggedError::capture(&err);
        assert!(captured.class.ends_with("Outer"));
        assert_eq!(captured.message, "Controller failed");
        assert!(captured.file.as_deref().unwrap().ends_with("logged_error.rs"));

        let previous = captured.previous.expect("source captured");
        assert_eq!(previous.class, "ParseIntError");
        assert!(previous.previous.is_none());
    }
}
