//! Logging macros for ergonomic log message formatting.
//!
//! These macros take any logger (a `ChannelLogger`, an `Arc<dyn Logger>`, a
//! reference to either) followed by `format!` arguments, and return the
//! logger's `Result`.
//!
//! # Examples
//!
//! ```
//! use channel_logger::prelude::*;
//! use channel_logger::{info, warning};
//! use channel_logger::sinks::MemorySink;
//!
//! let sink = MemorySink::new();
//! let logger = ChannelLogger::new("app", Environment::new("dev"), sink.clone());
//!
//! info!(logger, "Server started").unwrap();
//!
//! let port = 8080;
//! warning!(logger, "Port {} is already bound", port).unwrap();
//! assert_eq!(sink.len(), 2);
//! ```

/// Log at an explicit level with an empty context.
///
/// ```
/// # use channel_logger::prelude::*;
/// # let logger = ChannelLogger::new("app", Environment::default(), channel_logger::sinks::NullSink);
/// use channel_logger::log;
/// log!(logger, LogLevel::Notice, "Cache warmed in {} ms", 12).unwrap();
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        use $crate::core::Logger as _;
        $logger.log($level, &format!($($arg)+), $crate::core::LogContext::new())
    }};
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::core::LogLevel::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::core::LogLevel::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! notice {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::core::LogLevel::Notice, $($arg)+)
    };
}

#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::core::LogLevel::Warning, $($arg)+)
    };
}

/// Log an error-level message.
///
/// ```
/// # use channel_logger::prelude::*;
/// # let logger = ChannelLogger::new("app", Environment::default(), channel_logger::sinks::NullSink);
/// use channel_logger::error;
/// error!(logger, "Connection failed: {}", "timeout").unwrap();
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::core::LogLevel::Error, $($arg)+)
    };
}

#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::core::LogLevel::Critical, $($arg)+)
    };
}

#[macro_export]
macro_rules! alert {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::core::LogLevel::Alert, $($arg)+)
    };
}

/// Log an emergency; buffering loggers deliver these immediately.
#[macro_export]
macro_rules! emergency {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::core::LogLevel::Emergency, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{ChannelLogger, Environment, Logger, LogLevel};
    use crate::formatters::LineFormatter;
    use crate::sinks::MemorySink;
    use std::sync::Arc;

    fn logger(sink: &MemorySink) -> ChannelLogger {
        ChannelLogger::new("app", Environment::default(), sink.clone())
            .with_formatter(LineFormatter::with_format("{level} {message}"))
    }

    #[test]
    fn test_all_levels() {
        let sink = MemorySink::new();
        let logger = logger(&sink);

        crate::debug!(logger, "d").unwrap();
        crate::info!(logger, "i").unwrap();
        crate::notice!(logger, "n").unwrap();
        crate::warning!(logger, "w").unwrap();
        crate::error!(logger, "e").unwrap();
        crate::critical!(logger, "c").unwrap();
        crate::alert!(logger, "a").unwrap();
        crate::emergency!(logger, "em").unwrap();

        let levels: Vec<LogLevel> = sink.entries().into_iter().map(|(l, _)| l).collect();
        assert_eq!(levels, LogLevel::ALL.to_vec());
    }

    #[test]
    fn test_format_args() {
        let sink = MemorySink::new();
        let logger = logger(&sink);
        let user = "john";

        crate::info!(logger, "user {} logged in {} times", user, 3).unwrap();
        crate::info!(logger, "inline {user}").unwrap();
        assert_eq!(sink.lines(), vec!["INFO user john logged in 3 times", "INFO inline john"]);
    }

    #[test]
    fn test_shared_logger() {
        let sink = MemorySink::new();
        let shared: Arc<dyn Logger> = Arc::new(logger(&sink));

        crate::log!(shared, LogLevel::Alert, "via arc").unwrap();
        crate::log!(&shared, LogLevel::Alert, "via ref").unwrap();
        assert_eq!(sink.len(), 2);
    }
}
