//! Per-metric change computation
//!
//! Pure derivation of delta/percent/sign from a current and previous value.
//! This is the only place delta arithmetic happens; everything downstream
//! (threshold evaluation, alert dispatch, display) consumes the
//! [`ChangeRecord`] produced here.

use std::sync::LazyLock;

use regex::Regex;

use crate::{ChangeRecord, DeltaSign, Direction};

/// Ids following latency-style naming conventions, where lower is better.
static LATENCY_STYLE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"aht|frt|crt").expect("invalid latency id pattern"));

/// Round to two decimals, matching the display precision of the wallboard.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fallback direction for metrics whose source entry carries none:
/// latency-style ids improve downward, everything else upward.
pub fn infer_direction(id: &str) -> Direction {
    if LATENCY_STYLE_ID.is_match(id) {
        Direction::LowerIsBetter
    } else {
        Direction::HigherIsBetter
    }
}

/// Compute the change record for one metric.
///
/// With no previous value all derived fields are absent. `percent` is
/// absent when the previous value was 0. `sign` is absent for a zero
/// delta; otherwise it classifies the move against `direction`.
pub fn compute(current: f64, previous: Option<f64>, direction: Direction) -> ChangeRecord {
    let Some(previous) = previous else {
        return ChangeRecord {
            current,
            previous: None,
            delta: None,
            percent: None,
            sign: None,
        };
    };

    let delta = round2(current - previous);
    let percent = if previous == 0.0 {
        None
    } else {
        Some(round2((current - previous) / previous.abs() * 100.0))
    };

    let sign = if delta == 0.0 {
        None
    } else {
        let increased = delta > 0.0;
        let good = (direction == Direction::HigherIsBetter) == increased;
        Some(if good { DeltaSign::Good } else { DeltaSign::Bad })
    };

    ChangeRecord {
        current,
        previous: Some(previous),
        delta: Some(delta),
        percent,
        sign,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_observation_has_no_derived_fields() {
        let record = compute(42.0, None, Direction::HigherIsBetter);

        assert_eq!(record.current, 42.0);
        assert_eq!(record.previous, None);
        assert_eq!(record.delta, None);
        assert_eq!(record.percent, None);
        assert_eq!(record.sign, None);
    }

    #[test]
    fn test_increase_when_higher_is_better_is_good() {
        let record = compute(110.0, Some(100.0), Direction::HigherIsBetter);

        assert_eq!(record.delta, Some(10.0));
        assert_eq!(record.percent, Some(10.0));
        assert_eq!(record.sign, Some(DeltaSign::Good));
    }

    #[test]
    fn test_decrease_when_lower_is_better_is_good() {
        let record = compute(90.0, Some(100.0), Direction::LowerIsBetter);

        assert_eq!(record.delta, Some(-10.0));
        assert_eq!(record.sign, Some(DeltaSign::Good));
    }

    #[test]
    fn test_increase_when_lower_is_better_is_bad() {
        let record = compute(110.0, Some(100.0), Direction::LowerIsBetter);

        assert_eq!(record.sign, Some(DeltaSign::Bad));
    }

    #[test]
    fn test_zero_previous_suppresses_percent() {
        let record = compute(5.0, Some(0.0), Direction::HigherIsBetter);

        assert_eq!(record.delta, Some(5.0));
        assert_eq!(record.percent, None);
        assert_eq!(record.sign, Some(DeltaSign::Good));
    }

    #[test]
    fn test_zero_delta_has_no_sign() {
        let record = compute(100.0, Some(100.0), Direction::HigherIsBetter);

        assert_eq!(record.delta, Some(0.0));
        assert_eq!(record.sign, None);
    }

    #[test]
    fn test_percent_uses_absolute_previous() {
        // A move from -50 to -40 is +10, i.e. +20% of |previous|.
        let record = compute(-40.0, Some(-50.0), Direction::HigherIsBetter);

        assert_eq!(record.delta, Some(10.0));
        assert_eq!(record.percent, Some(20.0));
    }

    #[test]
    fn test_rounding_to_two_decimals() {
        let record = compute(100.0 + 1.0 / 3.0, Some(100.0), Direction::HigherIsBetter);

        assert_eq!(record.delta, Some(0.33));
        assert_eq!(record.percent, Some(0.33));
    }

    #[test]
    fn test_compute_is_deterministic() {
        let a = compute(123.456, Some(120.0), Direction::LowerIsBetter);
        let b = compute(123.456, Some(120.0), Direction::LowerIsBetter);

        assert_eq!(a, b);
    }

    #[test]
    fn test_direction_inference() {
        assert_eq!(infer_direction("aht_seconds"), Direction::LowerIsBetter);
        assert_eq!(infer_direction("frt_seconds"), Direction::LowerIsBetter);
        assert_eq!(infer_direction("crt_minutes"), Direction::LowerIsBetter);
        assert_eq!(infer_direction("icsat_pct"), Direction::HigherIsBetter);
        assert_eq!(infer_direction("conversations_today"), Direction::HigherIsBetter);
    }
}
