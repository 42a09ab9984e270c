//! Threshold rules and crossing evaluation
//!
//! A [`ThresholdRule`] describes when a metric's change should trigger an
//! alert and which sound identifies it. Rules are user-edited, serialized
//! as the `thresholds_cfg` blob, and evaluated once per metric per poll
//! cycle by [`fires`].

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::MetricId;

/// Fixed set of audio alert identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundCategory {
    Warning,
    Celebration,
    Subtle,
}

/// Restricts a rule to changes in one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleDirection {
    Up,
    Down,
}

/// How a rule's thresholds are compared against a change.
///
/// Persisted rules may carry modes written by newer versions; those decode
/// as [`RuleMode::Unknown`] and never fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleMode {
    Either,
    Percent,
    Absolute,
    Increase,
    Decrease,
    #[default]
    Unknown,
}

impl<'de> Deserialize<'de> for RuleMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "either" => RuleMode::Either,
            "percent" => RuleMode::Percent,
            "absolute" => RuleMode::Absolute,
            "increase" => RuleMode::Increase,
            "decrease" => RuleMode::Decrease,
            _ => RuleMode::Unknown,
        })
    }
}

/// Per-metric alert configuration.
///
/// Serialized with the camelCase field names of the persisted
/// `thresholds_cfg` JSON so stored blobs from earlier deployments keep
/// loading.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThresholdRule {
    pub mode: RuleMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_absolute: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_direction: Option<RuleDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_cross: Option<SoundCategory>,
}

/// A partial rule edit. Outer `None` leaves the field untouched;
/// `Some(None)` clears an optional field; `Some(Some(..))` sets it.
#[derive(Debug, Clone, Default)]
pub struct RulePatch {
    pub mode: Option<RuleMode>,
    pub threshold_percent: Option<Option<f64>>,
    pub threshold_absolute: Option<Option<f64>>,
    pub require_direction: Option<Option<RuleDirection>>,
    pub on_cross: Option<Option<SoundCategory>>,
}

impl ThresholdRule {
    /// Shallow field overwrite; fields absent from the patch are preserved.
    pub fn apply(&mut self, patch: RulePatch) {
        if let Some(mode) = patch.mode {
            self.mode = mode;
        }
        if let Some(threshold_percent) = patch.threshold_percent {
            self.threshold_percent = threshold_percent;
        }
        if let Some(threshold_absolute) = patch.threshold_absolute {
            self.threshold_absolute = threshold_absolute;
        }
        if let Some(require_direction) = patch.require_direction {
            self.require_direction = require_direction;
        }
        if let Some(on_cross) = patch.on_cross {
            self.on_cross = on_cross;
        }
    }
}

/// Built-in rule set covering the metrics that alert out of the box.
/// Metrics without an entry never fire until the user configures one.
pub fn default_rules() -> HashMap<MetricId, ThresholdRule> {
    HashMap::from([
        (
            "aht_seconds".to_string(),
            ThresholdRule {
                mode: RuleMode::Either,
                threshold_percent: Some(5.0),
                threshold_absolute: Some(15.0),
                require_direction: Some(RuleDirection::Up),
                on_cross: Some(SoundCategory::Warning),
            },
        ),
        (
            "coaching_today".to_string(),
            ThresholdRule {
                mode: RuleMode::Absolute,
                threshold_percent: None,
                threshold_absolute: Some(1.0),
                require_direction: Some(RuleDirection::Up),
                on_cross: Some(SoundCategory::Celebration),
            },
        ),
        (
            "icsat_pct".to_string(),
            ThresholdRule {
                mode: RuleMode::Percent,
                threshold_percent: Some(-2.0),
                threshold_absolute: None,
                require_direction: Some(RuleDirection::Down),
                on_cross: Some(SoundCategory::Subtle),
            },
        ),
    ])
}

/// Decide whether a rule fires for a computed change.
///
/// Callers only invoke this when a delta exists and is non-zero; a zero or
/// absent delta never alerts. The directional gate applies before any mode
/// comparison. A negative percent threshold is a floor (fires at or below
/// it), a non-negative one a ceiling crossed upward.
pub fn fires(rule: &ThresholdRule, delta: f64, percent: Option<f64>) -> bool {
    match rule.require_direction {
        Some(RuleDirection::Up) if delta <= 0.0 => return false,
        Some(RuleDirection::Down) if delta >= 0.0 => return false,
        _ => {}
    }

    match rule.mode {
        RuleMode::Percent => percent_crossed(rule.threshold_percent, percent),
        RuleMode::Absolute => absolute_crossed(rule.threshold_absolute, delta),
        RuleMode::Either => {
            percent_crossed(rule.threshold_percent, percent)
                || absolute_crossed(rule.threshold_absolute, delta)
        }
        RuleMode::Increase => match rule.threshold_absolute {
            Some(threshold) => delta >= threshold,
            None => delta > 0.0,
        },
        RuleMode::Decrease => match rule.threshold_absolute {
            Some(threshold) => delta <= -threshold.abs(),
            None => delta < 0.0,
        },
        RuleMode::Unknown => false,
    }
}

fn percent_crossed(threshold: Option<f64>, percent: Option<f64>) -> bool {
    let (Some(threshold), Some(percent)) = (threshold, percent) else {
        return false;
    };

    if threshold < 0.0 {
        percent <= threshold
    } else {
        percent >= threshold
    }
}

fn absolute_crossed(threshold: Option<f64>, delta: f64) -> bool {
    let Some(threshold) = threshold else {
        return false;
    };

    delta.abs() >= threshold.abs()
}
