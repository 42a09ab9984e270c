pub mod actors;
pub mod audio;
pub mod change;
pub mod config;
pub mod fetch;
pub mod storage;
pub mod thresholds;
pub mod util;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a metric, stable across polls. All per-metric state
/// (previous value, threshold rule) is keyed by it.
pub type MetricId = String;

/// Whether an increase of a metric's value is an improvement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

/// Classification of a non-zero delta relative to the metric's direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaSign {
    Good,
    Bad,
}

/// One metric entry as reported by the metrics source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSample {
    pub id: MetricId,
    #[serde(deserialize_with = "lenient_value")]
    pub value: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub direction: Option<Direction>,
}

/// Payload of the metrics source endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcePayload {
    pub metrics: Vec<MetricSample>,
    pub timestamp: DateTime<Utc>,
    pub tenant: String,
}

/// A snapshot of all metric values captured at one instant. Immutable once
/// built; lookups are by metric id.
#[derive(Debug, Clone)]
pub struct MetricSnapshot {
    values: HashMap<MetricId, f64>,
    samples: HashMap<MetricId, MetricSample>,
    pub timestamp: DateTime<Utc>,
    pub tenant: String,
}

impl MetricSnapshot {
    pub fn from_payload(payload: SourcePayload) -> Self {
        let values = payload
            .metrics
            .iter()
            .map(|m| (m.id.clone(), m.value))
            .collect();
        let samples = payload
            .metrics
            .into_iter()
            .map(|m| (m.id.clone(), m))
            .collect();

        Self {
            values,
            samples,
            timestamp: payload.timestamp,
            tenant: payload.tenant,
        }
    }

    /// Value for a metric id; ids missing from the snapshot read as 0.
    pub fn value(&self, id: &str) -> f64 {
        self.values.get(id).copied().unwrap_or(0.0)
    }

    pub fn unit(&self, id: &str) -> &str {
        self.samples.get(id).map(|m| m.unit.as_str()).unwrap_or("")
    }

    /// Direction reported by the source, if any. Callers fall back to
    /// [`change::infer_direction`] when absent.
    pub fn direction(&self, id: &str) -> Option<Direction> {
        self.samples.get(id).and_then(|m| m.direction)
    }

    /// The captured id → value mapping, the shape persisted as the
    /// previous-value snapshot after a completed cycle.
    pub fn value_map(&self) -> &HashMap<MetricId, f64> {
        &self.values
    }
}

/// Derived change state for one metric in one poll cycle.
///
/// `previous == None` means first observation: every derived field is
/// absent. `percent` is also absent when the previous value was 0.
/// `sign` is absent exactly when there is no delta or the delta is 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub current: f64,
    pub previous: Option<f64>,
    pub delta: Option<f64>,
    pub percent: Option<f64>,
    pub sign: Option<DeltaSign>,
}

/// One point of trend history, passed through for chart display. The core
/// never interprets these beyond decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    pub time: String,
    pub value: f64,
}

/// The source may report values as numbers or numeric strings; anything
/// malformed decodes to 0.
fn lenient_value<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(match raw {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}
