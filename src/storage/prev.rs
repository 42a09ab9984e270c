//! Previous-value snapshot persistence
//!
//! The single piece of cross-cycle state: the `prev_metrics` blob mapping
//! metric id to the last value seen. It is replaced wholesale exactly
//! once per poll cycle, after computation completes, so a crash mid-cycle
//! never leaves a half-updated snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::MetricId;

use super::PREV_METRICS_KEY;
use super::kv::KeyValueStore;

pub struct PreviousValueStore {
    store: Arc<dyn KeyValueStore>,
}

impl PreviousValueStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the last persisted snapshot. Absent or corrupt storage reads
    /// as an empty map; every metric is then a first observation.
    pub fn load(&self) -> HashMap<MetricId, f64> {
        let Some(raw) = self.store.get(PREV_METRICS_KEY) else {
            return HashMap::new();
        };

        match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(e) => {
                warn!("persisted previous values unreadable, starting fresh: {e}");
                HashMap::new()
            }
        }
    }

    /// Overwrite the whole snapshot in one persisted write.
    pub fn replace_all(&self, values: &HashMap<MetricId, f64>) {
        match serde_json::to_string(values) {
            Ok(json) => self.store.set(PREV_METRICS_KEY, &json),
            Err(e) => warn!("failed to serialize previous values: {e}"),
        }
    }
}
