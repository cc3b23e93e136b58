//! Call-stack capture shared by error capture and call-site introspection

use std::backtrace::Backtrace;

/// One resolved frame of a captured backtrace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub function: String,
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl Frame {
    /// `function (file:line)` or just the function when the location is unknown
    pub fn describe(&self) -> String {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => format!("{} ({}:{})", self.function, file, line),
            (Some(file), None) => format!("{} ({})", self.function, file),
            _ => self.function.clone(),
        }
    }
}

/// Capture frames honoring `RUST_BACKTRACE`; empty when capture is disabled
pub fn capture() -> Vec<Frame> {
    parse(&Backtrace::capture())
}

/// Capture frames regardless of environment configuration
pub fn force_capture() -> Vec<Frame> {
    parse(&Backtrace::force_capture())
}

// std does not expose frames on stable, so the rendered form is parsed:
//    3: crate::module::function
//              at ./src/module.rs:42:9
fn parse(backtrace: &Backtrace) -> Vec<Frame> {
    parse_rendered(&backtrace.to_string())
}

fn parse_rendered(rendered: &str) -> Vec<Frame> {
    let mut frames: Vec<Frame> = Vec::new();

    for raw in rendered.lines() {
        let line = raw.trim();
        if let Some(location) = line.strip_prefix("at ") {
            if let Some(frame) = frames.last_mut() {
                if frame.file.is_none() {
                    let (file, line_no) = split_location(location);
                    frame.file = Some(file);
                    frame.line = line_no;
                }
            }
            continue;
        }

        let Some((index, function)) = line.split_once(": ") else {
            continue;
        };
        if !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()) {
            frames.push(Frame {
                function: function.trim().to_string(),
                file: None,
                line: None,
            });
        }
    }

    frames
}

fn split_location(location: &str) -> (String, Option<u32>) {
    let mut parts = location.rsplitn(3, ':');
    let last = parts.next();
    let middle = parts.next();
    let rest = parts.next();

    match (rest, middle, last) {
        // path:line:column
        (Some(path), Some(line), Some(_col)) => match line.parse() {
            Ok(n) => (path.to_string(), Some(n)),
            Err(_) => (location.to_string(), None),
        },
        // path:line
        (None, Some(path), Some(line)) => match line.parse() {
            Ok(n) => (path.to_string(), Some(n)),
            Err(_) => (location.to_string(), None),
        },
        _ => (location.to_string(), None),
    }
}
