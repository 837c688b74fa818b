//! Unit tests for the rule engine

use proptest::prelude::*;
use signatrix::models::{IndicatorContext, RuleRef, RuleSpec, ValidationConfig};
use signatrix::rules::RuleEngine;
use serde_json::json;

fn config(raw: serde_json::Value) -> ValidationConfig {
    ValidationConfig::from_json(&raw.to_string()).expect("valid config")
}

fn ctx() -> IndicatorContext {
    IndicatorContext::new("BTCUSDT", "15m")
        .with("rsi", 65.0)
        .with("macd_hist", 0.0012)
        .with("ema.20", 101.0)
        .with("close", 100.0)
}

#[test]
fn test_field_threshold_ops() {
    let cfg = config(json!({}));
    let engine = RuleEngine::new(&cfg);
    let ctx = ctx();

    let lt: RuleSpec = serde_json::from_value(
        json!({ "kind": "field_threshold", "field": "rsi", "op": "lt", "value": 70.0 }),
    )
    .unwrap();
    let outcome = engine.evaluate(&lt, &ctx);
    assert!(outcome.passed);
    assert_eq!(outcome.value, Some(65.0));

    let gt: RuleSpec = serde_json::from_value(
        json!({ "kind": "field_threshold", "field": "macd_hist", "op": "gt", "value": 0.0 }),
    )
    .unwrap();
    assert!(engine.evaluate(&gt, &ctx).passed);

    let eq: RuleSpec = serde_json::from_value(
        json!({ "kind": "field_threshold", "field": "close", "op": "eq", "value": 100.0 }),
    )
    .unwrap();
    assert!(engine.evaluate(&eq, &ctx).passed);
}

#[test]
fn test_eps_tolerance_on_equality_and_strict_ops() {
    let cfg = config(json!({}));
    let engine = RuleEngine::new(&cfg);
    let ctx = IndicatorContext::new("BTCUSDT", "15m").with("x", 1.0);

    // Within eps of the threshold: eq passes, strict gt/lt do not.
    let eq: RuleSpec = serde_json::from_value(
        json!({ "kind": "field_threshold", "field": "x", "op": "eq", "value": 1.0000000001 }),
    )
    .unwrap();
    assert!(engine.evaluate(&eq, &ctx).passed);

    let gt: RuleSpec = serde_json::from_value(
        json!({ "kind": "field_threshold", "field": "x", "op": "gt", "value": 1.0 }),
    )
    .unwrap();
    assert!(!engine.evaluate(&gt, &ctx).passed);

    let lt: RuleSpec = serde_json::from_value(
        json!({ "kind": "field_threshold", "field": "x", "op": "lt", "value": 1.0 }),
    )
    .unwrap();
    assert!(!engine.evaluate(&lt, &ctx).passed);
}

#[test]
fn test_missing_field_fails_without_panicking() {
    let cfg = config(json!({}));
    let engine = RuleEngine::new(&cfg);
    let spec: RuleSpec = serde_json::from_value(
        json!({ "kind": "field_threshold", "field": "nope", "op": "gt", "value": 0.0 }),
    )
    .unwrap();
    let outcome = engine.evaluate(&spec, &ctx());
    assert!(!outcome.passed);
    assert_eq!(outcome.value, None);
}

#[test]
fn test_binary_compare_field_vs_field_and_literal() {
    let cfg = config(json!({}));
    let engine = RuleEngine::new(&cfg);
    let ctx = ctx();

    let spec: RuleSpec = serde_json::from_value(
        json!({ "kind": "binary_compare", "op": ">", "left": "ema.20", "right": "close" }),
    )
    .unwrap();
    assert!(engine.evaluate(&spec, &ctx).passed);

    let spec: RuleSpec = serde_json::from_value(
        json!({ "kind": "binary_compare", "op": "<=", "left": "close", "right": 100.0 }),
    )
    .unwrap();
    assert!(engine.evaluate(&spec, &ctx).passed);
}

#[test]
fn test_empty_compositions() {
    let cfg = config(json!({}));
    let engine = RuleEngine::new(&cfg);
    let ctx = ctx();

    let all: RuleSpec = serde_json::from_value(json!({ "kind": "all_of", "children": [] })).unwrap();
    assert!(engine.evaluate(&all, &ctx).passed, "empty all_of is vacuously true");

    let any: RuleSpec = serde_json::from_value(json!({ "kind": "any_of", "children": [] })).unwrap();
    assert!(!engine.evaluate(&any, &ctx).passed, "empty any_of is false");
}

#[test]
fn test_unknown_named_rule_fails() {
    let cfg = config(json!({}));
    let engine = RuleEngine::new(&cfg);
    let outcome = engine.evaluate_ref(&RuleRef::Named("ghost".to_string()), &ctx());
    assert!(!outcome.passed);
}

#[test]
fn test_alias_override_replaces_only_present_fields() {
    let cfg = config(json!({
        "rules": {
            "rsi_lt_70": { "kind": "field_threshold", "field": "rsi", "op": "lt", "value": 70.0 }
        }
    }));
    let engine = RuleEngine::new(&cfg);

    let alias: RuleSpec = serde_json::from_value(
        json!({ "kind": "alias", "name": "rsi_lt_70", "overrides": { "value": 72.0 } }),
    )
    .unwrap();

    // rsi = 71 fails the base but passes the widened alias.
    let ctx = IndicatorContext::new("BTCUSDT", "15m").with("rsi", 71.0);
    assert!(engine.evaluate(&alias, &ctx).passed);
    assert!(!engine.evaluate(cfg.rule("rsi_lt_70").unwrap(), &ctx).passed);

    let resolved = engine.resolve_alias("rsi_lt_70", &Default::default()).unwrap();
    match resolved {
        RuleSpec::FieldThreshold { field, value, .. } => {
            assert_eq!(field, "rsi");
            assert_eq!(value, 70.0, "shared base must stay untouched");
        }
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[test]
fn test_alias_cycle_fails_instead_of_recursing() {
    let cfg = config(json!({
        "rules": {
            "a": { "kind": "alias", "name": "b" },
            "b": { "kind": "alias", "name": "a" }
        }
    }));
    let engine = RuleEngine::new(&cfg);
    let outcome = engine.evaluate_ref(&RuleRef::Named("a".to_string()), &ctx());
    assert!(!outcome.passed);
}

#[test]
fn test_composition_cycle_fails_instead_of_recursing() {
    // Cycle through named composition children rather than aliases.
    let cfg = config(json!({
        "rules": {
            "a": { "kind": "all_of", "children": ["b"] },
            "b": { "kind": "all_of", "children": ["a"] }
        }
    }));
    let engine = RuleEngine::new(&cfg);
    let outcome = engine.evaluate_ref(&RuleRef::Named("a".to_string()), &ctx());
    assert!(!outcome.passed);

    let cfg = config(json!({
        "rules": {
            "self_ref": { "kind": "any_of", "children": ["self_ref"] }
        }
    }));
    let engine = RuleEngine::new(&cfg);
    let outcome = engine.evaluate_ref(&RuleRef::Named("self_ref".to_string()), &ctx());
    assert!(!outcome.passed);
}

#[test]
fn test_evaluation_is_idempotent() {
    let cfg = config(json!({
        "rules": {
            "macd_hist_gt_eps": { "kind": "field_threshold", "field": "macd_hist", "op": "gt", "value": 0.0 }
        }
    }));
    let engine = RuleEngine::new(&cfg);
    let spec: RuleSpec = serde_json::from_value(json!({
        "kind": "all_of",
        "children": ["macd_hist_gt_eps", { "kind": "field_threshold", "field": "rsi", "op": "lt", "value": 70.0 }]
    }))
    .unwrap();
    let ctx = ctx();
    let first = engine.evaluate(&spec, &ctx);
    let second = engine.evaluate(&spec, &ctx);
    assert_eq!(first.passed, second.passed);
    assert_eq!(first.value, second.value);
}

/// Inline child that passes or fails deterministically against `ctx()`.
fn child(pass: bool) -> serde_json::Value {
    let value = if pass { -1.0 } else { 1.0 };
    json!({ "kind": "field_threshold", "field": "close", "op": "gt", "value": value * 1000.0 })
}

proptest! {
    #[test]
    fn prop_all_of_passes_iff_every_child_passes(flags in proptest::collection::vec(any::<bool>(), 0..8)) {
        let cfg = config(json!({}));
        let engine = RuleEngine::new(&cfg);
        let children: Vec<_> = flags.iter().map(|&f| child(f)).collect();
        let spec: RuleSpec = serde_json::from_value(json!({ "kind": "all_of", "children": children })).unwrap();
        let outcome = engine.evaluate(&spec, &ctx());
        prop_assert_eq!(outcome.passed, flags.iter().all(|&f| f));
    }

    #[test]
    fn prop_any_of_passes_iff_some_child_passes(flags in proptest::collection::vec(any::<bool>(), 0..8)) {
        let cfg = config(json!({}));
        let engine = RuleEngine::new(&cfg);
        let children: Vec<_> = flags.iter().map(|&f| child(f)).collect();
        let spec: RuleSpec = serde_json::from_value(json!({ "kind": "any_of", "children": children })).unwrap();
        let outcome = engine.evaluate(&spec, &ctx());
        prop_assert_eq!(outcome.passed, flags.iter().any(|&f| f));
    }
}
