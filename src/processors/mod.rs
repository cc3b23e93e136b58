//! Record processors and the registry the factory resolves them from

pub mod introspection;
pub mod memory_usage;
pub mod uid;

pub use introspection::IntrospectionProcessor;
pub use memory_usage::{format_bytes, MemoryUsageProcessor};
pub use uid::UidProcessor;

use crate::core::LogRecord;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Enriches or rewrites a record before it is formatted.
///
/// Processors run in configuration order and only for records that passed
/// the level filter.
pub trait Processor: Send + Sync {
    fn process(&self, record: LogRecord) -> LogRecord;
}

impl<F> Processor for F
where
    F: Fn(LogRecord) -> LogRecord + Send + Sync,
{
    fn process(&self, record: LogRecord) -> LogRecord {
        self(record)
    }
}

/// Builds a processor from the parameters of its configuration entry
pub type ProcessorBuilder = Arc<dyn Fn(&Map<String, Value>) -> Arc<dyn Processor> + Send + Sync>;

/// Maps processor identifiers to constructors.
///
/// A configuration entry is either a bare identifier (`"uid"`) or an object
/// naming the identifier under `type` with parameters alongside
/// (`{"type": "uid", "length": 12}`).
#[derive(Clone)]
pub struct ProcessorRegistry {
    builders: HashMap<String, ProcessorBuilder>,
}

impl ProcessorRegistry {
    /// Registry without any identifiers
    pub fn empty() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// Registry knowing `uid`, `memory_usage` and `introspection`, each also
    /// under its type name (`UidProcessor`, ...)
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();

        let uid: ProcessorBuilder = Arc::new(|params: &Map<String, Value>| -> Arc<dyn Processor> {
            let length = params
                .get("length")
                .and_then(Value::as_u64)
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(uid::DEFAULT_UID_LENGTH);
            Arc::new(UidProcessor::new(length))
        });
        registry.insert(&["uid", "UidProcessor"], uid);

        let memory: ProcessorBuilder = Arc::new(|params: &Map<String, Value>| -> Arc<dyn Processor> {
            let real_usage = params
                .get("real_usage")
                .and_then(Value::as_bool)
                .unwrap_or(true);
            Arc::new(MemoryUsageProcessor::new(real_usage))
        });
        registry.insert(&["memory_usage", "MemoryUsageProcessor"], memory);

        let introspection: ProcessorBuilder = Arc::new(|params: &Map<String, Value>| -> Arc<dyn Processor> {
            let skip_frames = params
                .get("skip_frames")
                .and_then(Value::as_u64)
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(0);
            let skip_prefixes = params
                .get("skip_prefixes")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            Arc::new(IntrospectionProcessor::new(skip_frames, skip_prefixes))
        });
        registry.insert(&["introspection", "IntrospectionProcessor"], introspection);

        registry
    }

    fn insert(&mut self, ids: &[&str], builder: ProcessorBuilder) {
        for id in ids {
            self.builders.insert((*id).to_string(), Arc::clone(&builder));
        }
    }

    /// Add or replace an identifier
    pub fn register<F>(&mut self, id: impl Into<String>, builder: F)
    where
        F: Fn(&Map<String, Value>) -> Arc<dyn Processor> + Send + Sync + 'static,
    {
        self.builders.insert(id.into(), Arc::new(builder));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.builders.contains_key(id)
    }

    /// Identifier of a configuration entry, if it has one
    pub fn entry_id(entry: &Value) -> Option<&str> {
        match entry {
            Value::String(id) => Some(id),
            Value::Object(map) => map.get("type").and_then(Value::as_str),
            _ => None,
        }
    }

    /// Build the processor a configuration entry describes; `None` when the
    /// entry is malformed or its identifier is unknown
    pub fn resolve(&self, entry: &Value) -> Option<Arc<dyn Processor>> {
        let builder = self.builders.get(Self::entry_id(entry)?)?;
        let params = match entry {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        Some(builder(&params))
    }
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&String> = self.builders.keys().collect();
        ids.sort();
        f.debug_struct("ProcessorRegistry").field("ids", &ids).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use serde_json::json;

    fn record() -> LogRecord {
        LogRecord::new(LogLevel::Info, "hello", "app")
    }

    #[test]
    fn test_default_ids() {
        let registry = ProcessorRegistry::with_defaults();
        for id in [
            "uid",
            "UidProcessor",
            "memory_usage",
            "MemoryUsageProcessor",
            "introspection",
            "IntrospectionProcessor",
        ] {
            assert!(registry.contains(id), "missing {}", id);
        }
        assert!(!ProcessorRegistry::empty().contains("uid"));
    }

    #[test]
    fn test_resolve_with_params() {
        let registry = ProcessorRegistry::with_defaults();
        let processor = registry.resolve(&json!({"type": "uid", "length": 12})).unwrap();
        let out = processor.process(record());
        assert_eq!(out.extra.get("uid").and_then(|v| v.as_str()).unwrap().len(), 12);
    }

    #[test]
    fn test_oversized_length_param() {
        let registry = ProcessorRegistry::with_defaults();
        let processor = registry
            .resolve(&json!({"type": "uid", "length": u64::MAX}))
            .unwrap();
        let out = processor.process(record());
        let len = out.extra.get("uid").and_then(|v| v.as_str()).unwrap().len();
        if usize::try_from(u64::MAX).is_ok() {
            assert_eq!(len, 32);
        } else {
            assert_eq!(len, uid::DEFAULT_UID_LENGTH);
        }
    }

    #[test]
    fn test_unknown_and_malformed_entries() {
        let registry = ProcessorRegistry::with_defaults();
        assert!(registry.resolve(&json!("nope")).is_none());
        assert!(registry.resolve(&json!({"length": 3})).is_none());
        assert!(registry.resolve(&json!(42)).is_none());
    }

    #[test]
    fn test_register_closure() {
        let mut registry = ProcessorRegistry::empty();
        registry.register("tag", |params: &Map<String, Value>| -> Arc<dyn Processor> {
            let tag = params
                .get("value")
                .and_then(Value::as_str)
                .unwrap_or("none")
                .to_string();
            Arc::new(move |mut r: LogRecord| {
                r.extra.add_field("tag", tag.clone());
                r
            })
        });

        let processor = registry.resolve(&json!({"type": "tag", "value": "blue"})).unwrap();
        let out = processor.process(record());
        assert_eq!(out.extra.get("tag").and_then(|v| v.as_str()), Some("blue"));
    }
}
