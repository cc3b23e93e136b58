//! File sink implementation

use crate::core::{LogLevel, LoggerError, Result, Sink};
use fs2::FileExt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends each line to a file under an exclusive lock.
///
/// The file is opened per write and the lock is held for that write only, so
/// several processes can share one log file. Nothing touches the disk before
/// the first line arrives.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }
}

impl Sink for FileSink {
    fn write(&mut self, _level: LogLevel, line: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                LoggerError::io_operation(
                    format!("opening '{}'", self.display_path()),
                    "cannot open log file for appending",
                    e,
                )
            })?;

        file.lock_exclusive()
            .map_err(|_| LoggerError::file_lock(self.display_path()))?;

        let mut output = String::with_capacity(line.len() + 1);
        output.push_str(line);
        output.push('\n');
        let written = file.write_all(output.as_bytes());
        let _ = FileExt::unlock(&file);

        written.map_err(|e| {
            LoggerError::io_operation(
                format!("writing '{}'", self.display_path()),
                "cannot append log line",
                e,
            )
        })
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_file_sink_appends_lines() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("app.log");

        let mut sink = FileSink::new(&path);
        sink.write(LogLevel::Info, "first")?;
        sink.write(LogLevel::Error, "second")?;

        let content = fs::read_to_string(&path)?;
        assert_eq!(content, "first\nsecond\n");
        Ok(())
    }

    #[test]
    fn test_file_not_created_before_first_write() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("lazy.log");

        let _sink = FileSink::new(&path);
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("app.log");

        let mut sink = FileSink::new(&path);
        let err = sink.write(LogLevel::Info, "line").unwrap_err();
        assert!(matches!(err, LoggerError::IoOperation { .. }));
    }
}
