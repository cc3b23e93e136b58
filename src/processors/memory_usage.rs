//! Memory usage processor

use super::Processor;
use crate::core::LogRecord;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Adds `memory_usage` and `memory_peak` of the current process to `extra`.
///
/// With `real_usage` the resident set size is reported, otherwise virtual
/// memory. The peak is the highest value this processor has observed.
pub struct MemoryUsageProcessor {
    real_usage: bool,
    system: Mutex<System>,
    pid: Option<Pid>,
    peak: AtomicU64,
}

impl MemoryUsageProcessor {
    pub fn new(real_usage: bool) -> Self {
        Self {
            real_usage,
            system: Mutex::new(System::new()),
            pid: sysinfo::get_current_pid().ok(),
            peak: AtomicU64::new(0),
        }
    }

    /// Current usage in bytes, 0 when the platform cannot report it
    pub fn current_bytes(&self) -> u64 {
        let Some(pid) = self.pid else {
            return 0;
        };
        let mut system = self.system.lock();
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        system
            .process(pid)
            .map(|p| if self.real_usage { p.memory() } else { p.virtual_memory() })
            .unwrap_or(0)
    }
}

impl Default for MemoryUsageProcessor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Processor for MemoryUsageProcessor {
    fn process(&self, mut record: LogRecord) -> LogRecord {
        let current = self.current_bytes();
        let peak = self.peak.fetch_max(current, Ordering::Relaxed).max(current);

        record.extra.add_field("memory_usage", format_bytes(current));
        record.extra.add_field("memory_peak", format_bytes(peak));
        record
    }
}

/// `1536` → `"1.5 KB"`; two decimals at most, GB is the largest unit
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}
