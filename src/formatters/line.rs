//! Human-readable single-line formatter

use super::Formatter;
use crate::core::{Environment, LogContext, LogRecord, TimestampFormat};

/// Template used when nothing else is configured
pub const DEFAULT_LINE_FORMAT: &str = "[{timestamp}] [{channel}.{env}] {level}: {message} {context}";

/// Renders a record through a template with the tokens `{timestamp}`,
/// `{env}`, `{level}`, `{channel}`, `{message}`, `{context}` and `{extra}`.
///
/// `{key}` placeholders inside the message are filled from the context;
/// placeholders with no matching key stay as written.
///
/// ```
/// use channel_logger::core::{Environment, LogContext, LogLevel, LogRecord};
/// use channel_logger::formatters::{Formatter, LineFormatter};
///
/// let formatter = LineFormatter::with_format("{message}");
/// let record = LogRecord::new(LogLevel::Info, "User {user} performed {action}", "app")
///     .with_context(LogContext::new().with_field("user", "john").with_field("action", "checkout"));
///
/// assert_eq!(formatter.format(&record, &Environment::new("dev")), "User john performed checkout");
/// ```
#[derive(Debug, Clone)]
pub struct LineFormatter {
    format: String,
    timestamp_format: TimestampFormat,
    escape_newlines: bool,
}

impl LineFormatter {
    pub fn new() -> Self {
        Self::with_format(DEFAULT_LINE_FORMAT)
    }

    pub fn with_format(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            timestamp_format: TimestampFormat::default(),
            escape_newlines: true,
        }
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Keep raw line breaks in messages instead of escaping them
    #[must_use]
    pub fn allow_multiline(mut self) -> Self {
        self.escape_newlines = false;
        self
    }

    pub fn template(&self) -> &str {
        &self.format
    }

    /// Replace `{key}` placeholders in `message` with context values
    pub fn interpolate(message: &str, context: &LogContext) -> String {
        if !message.contains('{') {
            return message.to_string();
        }
        substitute(message, |key| context.get(key).map(|value| value.to_string()))
    }

    /// Escape line breaks so one record stays one line and cannot forge
    /// additional entries
    fn sanitize(message: String) -> String {
        if !message.contains(['\n', '\r', '\t']) {
            return message;
        }
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    fn encode(fields: &LogContext) -> String {
        if fields.is_empty() {
            return String::new();
        }
        fields.to_json_string().unwrap_or_default()
    }
}

impl Default for LineFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for LineFormatter {
    fn format(&self, record: &LogRecord, env: &Environment) -> String {
        let mut message = Self::interpolate(&record.message, &record.context);
        if self.escape_newlines {
            message = Self::sanitize(message);
        }

        let line = substitute(&self.format, |token| match token {
            "timestamp" => Some(self.timestamp_format.format(&record.timestamp)),
            "env" => Some(env.to_string()),
            "level" => Some(record.level.to_str().to_string()),
            "channel" => Some(record.channel.clone()),
            "message" => Some(message.clone()),
            "context" => Some(Self::encode(&record.context)),
            "extra" => Some(Self::encode(&record.extra)),
            _ => None,
        });

        line.trim_end().to_string()
    }
}

/// Single left-to-right pass over `template`: every `{name}` whose lookup
/// succeeds is replaced, everything else is copied verbatim. Substituted
/// text is never rescanned.
fn substitute<F>(template: &str, mut lookup: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        match after.find(['{', '}']) {
            Some(end) if after.as_bytes()[end] == b'}' => {
                let name = &after[..end];
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogLevel, LoggedError};
    use chrono::TimeZone;
    use serde_json::json;

    fn env() -> Environment {
        Environment::new("dev")
    }

    fn record(message: &str, context: LogContext) -> LogRecord {
        LogRecord::new(LogLevel::Info, message, "app").with_context(context)
    }

    #[test]
    fn test_message_interpolation() {
        let formatter = LineFormatter::with_format("{message}");
        let ctx = LogContext::new()
            .with_field("user", "john")
            .with_field("action", "checkout");

        let out = formatter.format(&record("User {user} performed {action}", ctx), &env());
        assert_eq!(out, "User john performed checkout");
    }

    #[test]
    fn test_missing_key_stays_literal() {
        let formatter = LineFormatter::with_format("{message}");
        let ctx = LogContext::new().with_field("user", "john");

        let out = formatter.format(&record("{user} bought {item}", ctx), &env());
        assert_eq!(out, "john bought {item}");
    }

    #[test]
    fn test_value_rendering() {
        let when = chrono::Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
        let ctx = LogContext::new()
            .with_field("count", 3)
            .with_field("ok", true)
            .with_field("when", when)
            .with_field("tags", json!(["a", "b"]));

        let out = LineFormatter::interpolate("{count} {ok} {when} {tags}", &ctx);
        assert_eq!(out, r#"3 true 2025-01-08T10:30:45+00:00 ["a","b"]"#);
    }

    #[test]
    fn test_substituted_text_is_not_rescanned() {
        let ctx = LogContext::new()
            .with_field("a", "{b}")
            .with_field("b", "nope");
        assert_eq!(LineFormatter::interpolate("{a}", &ctx), "{b}");
    }

    #[test]
    fn test_unbalanced_braces() {
        let ctx = LogContext::new().with_field("x", 1);
        assert_eq!(LineFormatter::interpolate("{{x} {", &ctx), "{1 {");
        assert_eq!(LineFormatter::interpolate("plain }", &ctx), "plain }");
    }

    #[test]
    fn test_template_tokens() {
        let formatter = LineFormatter::with_format("{channel}|{env}|{level}|{message}|{context}|{extra}");
        let mut rec = record("hello", LogContext::new().with_field("k", "v"));
        rec.extra.add_field("uid", "abc123");
        rec.level = LogLevel::Warning;

        let out = formatter.format(&rec, &Environment::new("production"));
        assert_eq!(out, r#"app|production|WARNING|hello|{"k":"v"}|{"uid":"abc123"}"#);
    }

    #[test]
    fn test_empty_context_and_trailing_space() {
        let formatter = LineFormatter::with_format("{level}: {message} {context}");
        let out = formatter.format(&record("no context", LogContext::new()), &env());
        assert_eq!(out, "INFO: no context");
    }

    #[test]
    fn test_unknown_template_token_kept() {
        let formatter = LineFormatter::with_format("{level} {hostname} {message}");
        let out = formatter.format(&record("hi", LogContext::new()), &env());
        assert_eq!(out, "INFO {hostname} hi");
    }

    #[test]
    fn test_newlines_escaped() {
        let formatter = LineFormatter::with_format("{message}");
        let out = formatter.format(&record("login\nERROR fake entry", LogContext::new()), &env());
        assert_eq!(out, "login\\nERROR fake entry");

        let formatter = LineFormatter::with_format("{message}").allow_multiline();
        let out = formatter.format(&record("a\nb", LogContext::new()), &env());
        assert_eq!(out, "a\nb");
    }

    #[test]
    fn test_timestamp_token() {
        let formatter = LineFormatter::with_format("{timestamp}")
            .with_timestamp_format(TimestampFormat::Custom("%Y".to_string()));
        let rec = record("x", LogContext::new());
        let expected = rec.timestamp.format("%Y").to_string();
        assert_eq!(formatter.format(&rec, &env()), expected);
    }

    #[test]
    fn test_error_value_interpolates_as_json() {
        let ctx = LogContext::new().with_field("exception", LoggedError::new("Oops", "bad"));
        let out = LineFormatter::interpolate("{exception}", &ctx);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["class"], "Oops");
    }
}
