//! Correlation id processor

use super::Processor;
use crate::core::LogRecord;
use parking_lot::RwLock;
use rand::Rng;

pub const DEFAULT_UID_LENGTH: usize = 8;

/// Stamps every record with the same random hex id until `reset` is called.
///
/// Long-running workers call `reset` at the start of each unit of work so the
/// lines of one job can be grepped together.
#[derive(Debug)]
pub struct UidProcessor {
    length: usize,
    uid: RwLock<String>,
}

impl UidProcessor {
    /// `length` is clamped to 4..=32 hex characters
    pub fn new(length: usize) -> Self {
        let length = length.clamp(4, 32);
        Self {
            length,
            uid: RwLock::new(generate(length)),
        }
    }

    pub fn uid(&self) -> String {
        self.uid.read().clone()
    }

    /// Start a new correlation scope
    pub fn reset(&self) {
        *self.uid.write() = generate(self.length);
    }
}

impl Default for UidProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_UID_LENGTH)
    }
}

impl Processor for UidProcessor {
    fn process(&self, mut record: LogRecord) -> LogRecord {
        record.extra.add_field("uid", self.uid());
        record
    }
}

fn generate(length: usize) -> String {
    let mut bytes = vec![0u8; length.div_ceil(2)];
    rand::thread_rng().fill(&mut bytes[..]);
    let mut hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    hex.truncate(length);
    hex
}
