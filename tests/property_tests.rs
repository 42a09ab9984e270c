//! Property-based tests for invariants using proptest
//!
//! These tests verify that certain properties hold true for all inputs:
//! - Delta/percent arithmetic and rounding
//! - First-observation and zero-previous edge cases
//! - Sign classification against the direction policy
//! - Threshold mode firing conditions and the directional gate

use proptest::prelude::*;
use wallboard::change::{compute, round2};
use wallboard::thresholds::{RuleDirection, RuleMode, ThresholdRule, fires};
use wallboard::{DeltaSign, Direction};

fn any_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::HigherIsBetter),
        Just(Direction::LowerIsBetter),
    ]
}

fn any_mode() -> impl Strategy<Value = RuleMode> {
    prop_oneof![
        Just(RuleMode::Either),
        Just(RuleMode::Percent),
        Just(RuleMode::Absolute),
        Just(RuleMode::Increase),
        Just(RuleMode::Decrease),
        Just(RuleMode::Unknown),
    ]
}

// Property: percent matches the rounded relative change for any non-zero previous
proptest! {
    #[test]
    fn prop_percent_formula(
        current in -10_000.0f64..10_000.0f64,
        previous in prop_oneof![-10_000.0f64..-0.01, 0.01f64..10_000.0],
        direction in any_direction(),
    ) {
        let record = compute(current, Some(previous), direction);

        let expected = round2((current - previous) / previous.abs() * 100.0);
        prop_assert_eq!(record.percent, Some(expected));
    }
}

// Property: a first observation derives nothing
proptest! {
    #[test]
    fn prop_first_observation_is_bare(
        current in -10_000.0f64..10_000.0f64,
        direction in any_direction(),
    ) {
        let record = compute(current, None, direction);

        prop_assert_eq!(record.previous, None);
        prop_assert_eq!(record.delta, None);
        prop_assert_eq!(record.percent, None);
        prop_assert_eq!(record.sign, None);
    }
}

// Property: zero previous suppresses percent but not delta
proptest! {
    #[test]
    fn prop_zero_previous_suppresses_percent(
        current in -10_000.0f64..10_000.0f64,
        direction in any_direction(),
    ) {
        let record = compute(current, Some(0.0), direction);

        prop_assert_eq!(record.percent, None);
        prop_assert_eq!(record.delta, Some(round2(current)));
    }
}

// Property: compute is deterministic for fixed inputs
proptest! {
    #[test]
    fn prop_compute_idempotent(
        current in -10_000.0f64..10_000.0f64,
        previous in proptest::option::of(-10_000.0f64..10_000.0),
        direction in any_direction(),
    ) {
        let a = compute(current, previous, direction);
        let b = compute(current, previous, direction);

        prop_assert_eq!(a, b);
    }
}

// Property: sign is present iff the rounded delta is non-zero, and matches
// the direction policy
proptest! {
    #[test]
    fn prop_sign_follows_direction(
        current in -10_000.0f64..10_000.0f64,
        previous in -10_000.0f64..10_000.0f64,
        direction in any_direction(),
    ) {
        let record = compute(current, Some(previous), direction);
        let delta = record.delta.unwrap();

        if delta == 0.0 {
            prop_assert_eq!(record.sign, None);
        } else {
            let increased = delta > 0.0;
            let good = (direction == Direction::HigherIsBetter) == increased;
            let expected = if good { DeltaSign::Good } else { DeltaSign::Bad };
            prop_assert_eq!(record.sign, Some(expected));
        }
    }
}

// Property: absolute mode fires exactly on |delta| >= |threshold|
proptest! {
    #[test]
    fn prop_absolute_mode_is_magnitude_comparison(
        delta in -1_000.0f64..1_000.0f64,
        threshold in -100.0f64..100.0f64,
    ) {
        prop_assume!(delta != 0.0);

        let rule = ThresholdRule {
            mode: RuleMode::Absolute,
            threshold_absolute: Some(threshold),
            ..Default::default()
        };

        prop_assert_eq!(fires(&rule, delta, None), delta.abs() >= threshold.abs());
    }
}

// Property: the Up gate blocks non-positive deltas for every mode and
// threshold combination
proptest! {
    #[test]
    fn prop_up_gate_blocks_decreases(
        delta in -1_000.0f64..=0.0,
        percent in proptest::option::of(-500.0f64..500.0),
        mode in any_mode(),
        threshold_percent in proptest::option::of(-100.0f64..100.0),
        threshold_absolute in proptest::option::of(-100.0f64..100.0),
    ) {
        let rule = ThresholdRule {
            mode,
            threshold_percent,
            threshold_absolute,
            require_direction: Some(RuleDirection::Up),
            ..Default::default()
        };

        prop_assert!(!fires(&rule, delta, percent));
    }
}

// Property: the Down gate blocks non-negative deltas symmetrically
proptest! {
    #[test]
    fn prop_down_gate_blocks_increases(
        delta in 0.0f64..1_000.0,
        percent in proptest::option::of(-500.0f64..500.0),
        mode in any_mode(),
        threshold_percent in proptest::option::of(-100.0f64..100.0),
        threshold_absolute in proptest::option::of(-100.0f64..100.0),
    ) {
        let rule = ThresholdRule {
            mode,
            threshold_percent,
            threshold_absolute,
            require_direction: Some(RuleDirection::Down),
            ..Default::default()
        };

        prop_assert!(!fires(&rule, delta, percent));
    }
}

// Property: unknown modes never fire, whatever the thresholds say
proptest! {
    #[test]
    fn prop_unknown_mode_never_fires(
        delta in -1_000.0f64..1_000.0,
        percent in proptest::option::of(-500.0f64..500.0),
        threshold_percent in proptest::option::of(-100.0f64..100.0),
        threshold_absolute in proptest::option::of(-100.0f64..100.0),
    ) {
        let rule = ThresholdRule {
            mode: RuleMode::Unknown,
            threshold_percent,
            threshold_absolute,
            require_direction: None,
            ..Default::default()
        };

        prop_assert!(!fires(&rule, delta, percent));
    }
}

// Property: either mode is the disjunction of its two legs
proptest! {
    #[test]
    fn prop_either_is_disjunction(
        delta in -1_000.0f64..1_000.0,
        percent in proptest::option::of(-500.0f64..500.0),
        threshold_percent in proptest::option::of(-100.0f64..100.0),
        threshold_absolute in proptest::option::of(-100.0f64..100.0),
    ) {
        prop_assume!(delta != 0.0);

        let percent_rule = ThresholdRule {
            mode: RuleMode::Percent,
            threshold_percent,
            ..Default::default()
        };
        let absolute_rule = ThresholdRule {
            mode: RuleMode::Absolute,
            threshold_absolute,
            ..Default::default()
        };
        let either_rule = ThresholdRule {
            mode: RuleMode::Either,
            threshold_percent,
            threshold_absolute,
            ..Default::default()
        };

        let expected = fires(&percent_rule, delta, percent) || fires(&absolute_rule, delta, percent);
        prop_assert_eq!(fires(&either_rule, delta, percent), expected);
    }
}
