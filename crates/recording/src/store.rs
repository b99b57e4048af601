/// Injected key-value persistence seam
///
/// Hosts that want durable UI state (last playhead position, panel
/// layout) supply an implementation; the playback engine itself never
/// reads or writes a store.
use crate::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Object-safe key-value storage interface
pub trait KeyValueStore {
    fn get_value(&self, key: &str) -> Option<Value>;
    fn set_value(&mut self, key: &str, value: Value);
    fn remove_value(&mut self, key: &str) -> Option<Value>;
}

/// Read a typed value, falling back to `default` when the key is
/// missing or holds something that no longer deserializes
pub fn store_get<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str, default: T) -> T {
    store
        .get_value(key)
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or(default)
}

/// Write a typed value under `key`
pub fn store_set<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let value = serde_json::to_value(value)?;
    store.set_value(key, value);
    Ok(())
}

/// In-memory store for hosts and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_value(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove_value(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }
}
