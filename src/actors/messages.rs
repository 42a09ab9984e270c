//! Message types for actor communication

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::thresholds::{RulePatch, SoundCategory, ThresholdRule};
use crate::{ChangeRecord, Direction, MetricId};

/// Per-metric outcome of one poll cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricChange {
    pub id: MetricId,
    pub unit: String,
    pub direction: Direction,
    pub record: ChangeRecord,

    /// Sound category dispatched for this metric, if its rule fired.
    pub fired: Option<SoundCategory>,
}

/// Event published after each completed poll cycle.
///
/// Broadcast to all interested subscribers (logging, a future UI feed).
/// The channel may lag or drop events for slow subscribers; cycles are
/// continuously produced, so gaps are acceptable.
#[derive(Debug, Clone)]
pub struct CycleEvent {
    /// Snapshot timestamp as reported by the source
    pub timestamp: DateTime<Utc>,

    /// Tenant the snapshot belongs to
    pub tenant: String,

    /// One entry per metric, in the configured display order
    pub changes: Vec<MetricChange>,
}

/// Commands understood by the poller actor.
#[derive(Debug)]
pub enum PollerCommand {
    /// Run a full cycle immediately, bypassing the interval timer.
    ///
    /// Used for testing and manual refresh.
    PollNow {
        respond_to: oneshot::Sender<anyhow::Result<()>>,
    },

    /// Merge a partial edit into one metric's rule and persist it.
    ///
    /// Applies from the next evaluation on; a cycle already in flight
    /// keeps the rule set it started with.
    UpdateRule { id: MetricId, patch: RulePatch },

    /// Replace all rules with the built-in defaults and persist.
    ResetRules,

    /// Read the current rule mapping.
    GetRules {
        respond_to: oneshot::Sender<HashMap<MetricId, ThresholdRule>>,
    },

    /// Gracefully shut down the poller. No further cycles run.
    Shutdown,
}
