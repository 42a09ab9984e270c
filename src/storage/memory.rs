//! In-memory key-value store (no persistence)
//!
//! Useful for tests and for running the wallboard without durable state;
//! everything is lost on restart, which the rest of the system already
//! tolerates (empty storage reads as "no history, default rules").

use std::collections::HashMap;
use std::sync::Mutex;

use super::kv::KeyValueStore;

/// Ephemeral [`KeyValueStore`] backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }
}
