//! Syslog sink implementation

use crate::core::{LogLevel, LoggerError, Result, Sink};
use fasyslog::format::SyslogContext;
use fasyslog::sender::SyslogSender;
use fasyslog::{Facility, Severity};
use std::path::{Path, PathBuf};

/// `LOG_USER` facility code
pub const DEFAULT_FACILITY: i32 = 1 << 3;

/// Local daemon sockets tried in order when no socket path is set
const WELL_KNOWN_SOCKETS: [&str; 3] = ["/dev/log", "/var/run/syslog", "/var/run/log"];

/// Map a `LOG_*` facility code (already shifted, e.g. `LOG_LOCAL0` = 128)
pub fn facility(code: i32) -> Option<Facility> {
    if code < 0 || code % 8 != 0 {
        return None;
    }
    let facility = match code >> 3 {
        0 => Facility::KERN,
        1 => Facility::USER,
        2 => Facility::MAIL,
        3 => Facility::DAEMON,
        4 => Facility::AUTH,
        5 => Facility::SYSLOG,
        6 => Facility::LPR,
        7 => Facility::NEWS,
        8 => Facility::UUCP,
        9 => Facility::CRON,
        10 => Facility::AUTHPRIV,
        11 => Facility::FTP,
        16 => Facility::LOCAL0,
        17 => Facility::LOCAL1,
        18 => Facility::LOCAL2,
        19 => Facility::LOCAL3,
        20 => Facility::LOCAL4,
        21 => Facility::LOCAL5,
        22 => Facility::LOCAL6,
        23 => Facility::LOCAL7,
        _ => return None,
    };
    Some(facility)
}

fn severity(level: LogLevel) -> Severity {
    match level {
        LogLevel::Emergency => Severity::EMERGENCY,
        LogLevel::Alert => Severity::ALERT,
        LogLevel::Critical => Severity::CRITICAL,
        LogLevel::Error => Severity::ERROR,
        LogLevel::Warning => Severity::WARNING,
        LogLevel::Notice => Severity::NOTICE,
        LogLevel::Info => Severity::INFORMATIONAL,
        LogLevel::Debug => Severity::DEBUG,
    }
}

/// Sends RFC 3164 messages to the local syslog daemon.
///
/// Each sink carries its own ident and facility in every message, so
/// several syslog channels can live side by side. The socket is opened on
/// the first write and reopened after a failed send.
pub struct SyslogSink {
    ident: String,
    facility: i32,
    context: SyslogContext,
    socket: Option<PathBuf>,
    sender: Option<SyslogSender>,
}

impl SyslogSink {
    pub fn new(ident: &str, facility_code: i32) -> Result<Self> {
        let facility = facility(facility_code).ok_or_else(|| {
            LoggerError::sink("syslog", format!("unknown facility {}", facility_code))
        })?;

        let mut context = SyslogContext::default();
        context.facility(facility);
        context.appname(ident);

        Ok(Self {
            ident: ident.to_string(),
            facility: facility_code,
            context,
            socket: None,
            sender: None,
        })
    }

    /// Send to `path` instead of the platform's well-known daemon socket
    #[must_use]
    pub fn with_socket(mut self, path: impl Into<PathBuf>) -> Self {
        self.socket = Some(path.into());
        self.sender = None;
        self
    }

    pub fn ident(&self) -> &str {
        &self.ident
    }

    pub fn facility(&self) -> i32 {
        self.facility
    }

    fn socket_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.socket {
            return Ok(path.clone());
        }
        WELL_KNOWN_SOCKETS
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
            .ok_or_else(|| LoggerError::sink("syslog", "no local syslog socket found"))
    }

    #[cfg(unix)]
    fn connect(&self) -> Result<SyslogSender> {
        let path = self.socket_path()?;
        fasyslog::sender::unix(&path).map_err(|e| {
            LoggerError::sink("syslog", format!("cannot connect to {}: {}", path.display(), e))
        })
    }

    #[cfg(not(unix))]
    fn connect(&self) -> Result<SyslogSender> {
        Err(LoggerError::sink(
            "syslog",
            "local syslog is not available on this platform",
        ))
    }
}

impl Sink for SyslogSink {
    fn write(&mut self, level: LogLevel, line: &str) -> Result<()> {
        let message = format!(
            "{}",
            self.context.format_rfc3164(severity(level), Some(line))
        );

        if self.sender.is_none() {
            self.sender = Some(self.connect()?);
        }
        let sent = match self.sender.as_mut() {
            Some(sender) => sender.send_formatted(message.as_bytes()),
            None => return Err(LoggerError::sink("syslog", "not connected")),
        };

        sent.map_err(|e| {
            self.sender = None;
            LoggerError::sink("syslog", format!("send failed: {}", e))
        })
    }

    fn flush(&mut self) -> Result<()> {
        match self.sender.as_mut() {
            Some(sender) => sender
                .flush()
                .map_err(|e| LoggerError::sink("syslog", format!("flush failed: {}", e))),
            None => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "syslog"
    }
}
