//! Threshold rule persistence
//!
//! Owns the `thresholds_cfg` blob: a JSON object mapping metric id to
//! [`ThresholdRule`]. Loading is all-or-nothing: a blob that fails to
//! parse as a whole yields the built-in defaults, never a partial merge.
//! Every mutation writes straight through; edits are human-paced, so
//! there is no batching.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::MetricId;
use crate::thresholds::{RulePatch, ThresholdRule, default_rules};

use super::THRESHOLDS_KEY;
use super::kv::KeyValueStore;

pub struct ThresholdRuleStore {
    store: Arc<dyn KeyValueStore>,
}

impl ThresholdRuleStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the persisted rule mapping, falling back to the built-in
    /// defaults on a missing key or any parse failure.
    pub fn load(&self) -> HashMap<MetricId, ThresholdRule> {
        let Some(raw) = self.store.get(THRESHOLDS_KEY) else {
            debug!("no persisted thresholds, using defaults");
            return default_rules();
        };

        match serde_json::from_str(&raw) {
            Ok(rules) => rules,
            Err(e) => {
                warn!("persisted thresholds unreadable, using defaults: {e}");
                default_rules()
            }
        }
    }

    /// Persist the full rule mapping, replacing prior content.
    pub fn save(&self, rules: &HashMap<MetricId, ThresholdRule>) {
        match serde_json::to_string(rules) {
            Ok(json) => self.store.set(THRESHOLDS_KEY, &json),
            Err(e) => warn!("failed to serialize thresholds: {e}"),
        }
    }

    /// Merge a partial edit into the rule for `id` and persist the result.
    /// A metric without an existing rule starts from an empty one.
    /// Returns the updated mapping.
    pub fn update(&self, id: &str, patch: RulePatch) -> HashMap<MetricId, ThresholdRule> {
        let mut rules = self.load();
        rules.entry(id.to_string()).or_default().apply(patch);
        self.save(&rules);
        rules
    }

    /// Replace the whole mapping with the built-in defaults and persist.
    pub fn reset_to_defaults(&self) -> HashMap<MetricId, ThresholdRule> {
        let rules = default_rules();
        self.save(&rules);
        rules
    }
}
