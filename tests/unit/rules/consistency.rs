//! Unit tests for the static consistency checker

use signatrix::models::{IssueKind, Severity, ValidationConfig};
use signatrix::rules::ConsistencyChecker;
use serde_json::json;

fn config(raw: serde_json::Value) -> ValidationConfig {
    ValidationConfig::from_json(&raw.to_string()).expect("valid config")
}

#[test]
fn test_clean_config_has_no_issues() {
    let cfg = config(json!({
        "rules": {
            "macd_up": { "kind": "field_threshold", "field": "macd_hist", "op": "gt", "value": 0.0 },
            "rsi_ok": { "kind": "field_threshold", "field": "rsi", "op": "lt", "value": 70.0 }
        },
        "timeframes": {
            "15m": { "long": ["macd_up", "rsi_ok"], "short": [] }
        }
    }));
    assert!(ConsistencyChecker::new(&cfg).check().is_empty());
}

#[test]
fn test_unreachable_rule_produces_exactly_one_issue() {
    let cfg = config(json!({
        "rules": {
            "macd_up": { "kind": "field_threshold", "field": "macd_hist", "op": "gt", "value": 0.0 },
            "orphan": { "kind": "field_threshold", "field": "adx", "op": "gt", "value": 20.0 },
            "rsi_ok": { "kind": "field_threshold", "field": "rsi", "op": "lt", "value": 70.0 }
        },
        "timeframes": {
            "15m": { "long": ["macd_up"], "short": [] }
        },
        "filters_mandatory": [],
        "execution_selector": { "guards": ["rsi_ok"] }
    }));
    let issues = ConsistencyChecker::new(&cfg).check();
    let unreachable: Vec<_> =
        issues.iter().filter(|i| i.kind == IssueKind::UnreachableRule).collect();
    assert_eq!(unreachable.len(), 1);
    assert_eq!(unreachable[0].affected_rules, vec!["orphan"]);
}

#[test]
fn test_transitive_dependency_is_reachable() {
    // "base" is only referenced through the alias, via a named rule.
    let cfg = config(json!({
        "rules": {
            "base": { "kind": "field_threshold", "field": "rsi", "op": "lt", "value": 70.0 },
            "widened": { "kind": "alias", "name": "base", "overrides": { "value": 75.0 } }
        },
        "timeframes": {
            "15m": { "long": ["widened"], "short": [] }
        }
    }));
    let issues = ConsistencyChecker::new(&cfg).check();
    assert!(issues.iter().all(|i| i.kind != IssueKind::UnreachableRule));
}

#[test]
fn test_contradiction_flagged_when_pair_shares_an_all_of() {
    let cfg = config(json!({
        "rules": {
            "trend_up": { "kind": "field_threshold", "field": "ema_slope", "op": "gt", "value": 0.0 },
            "trend_down": { "kind": "field_threshold", "field": "ema_slope", "op": "lt", "value": 0.0 }
        },
        "timeframes": {
            "15m": { "long": ["trend_up", "trend_down"], "short": [] }
        },
        "conflict_pairs": [["trend_up", "trend_down"]]
    }));
    let issues = ConsistencyChecker::new(&cfg).check();
    let contradiction: Vec<_> =
        issues.iter().filter(|i| i.kind == IssueKind::Contradiction).collect();
    assert_eq!(contradiction.len(), 1);
    assert_eq!(contradiction[0].severity, Severity::High);
    assert_eq!(contradiction[0].affected_rules, vec!["trend_up", "trend_down"]);
}

#[test]
fn test_contradiction_not_flagged_when_pair_never_conjoined() {
    let cfg = config(json!({
        "rules": {
            "trend_up": { "kind": "field_threshold", "field": "ema_slope", "op": "gt", "value": 0.0 },
            "trend_down": { "kind": "field_threshold", "field": "ema_slope", "op": "lt", "value": 0.0 }
        },
        "timeframes": {
            "15m": { "long": ["trend_up"], "short": ["trend_down"] }
        },
        "conflict_pairs": [["trend_up", "trend_down"]]
    }));
    let issues = ConsistencyChecker::new(&cfg).check();
    assert!(issues.iter().all(|i| i.kind != IssueKind::Contradiction));
}

#[test]
fn test_redundancy_when_composite_and_its_dependency_share_an_all_of() {
    let cfg = config(json!({
        "rules": {
            "rsi_ok": { "kind": "field_threshold", "field": "rsi", "op": "lt", "value": 70.0 },
            "macd_up": { "kind": "field_threshold", "field": "macd_hist", "op": "gt", "value": 0.0 },
            "momentum": { "kind": "all_of", "children": ["rsi_ok", "macd_up"] }
        },
        "timeframes": {
            "15m": { "long": ["momentum", "rsi_ok"], "short": [] }
        }
    }));
    let issues = ConsistencyChecker::new(&cfg).check();
    let redundancy: Vec<_> = issues.iter().filter(|i| i.kind == IssueKind::Redundancy).collect();
    assert!(!redundancy.is_empty());
    assert_eq!(redundancy[0].severity, Severity::Medium);
    assert!(redundancy[0].affected_rules.contains(&"momentum".to_string()));
    assert!(redundancy[0].affected_rules.contains(&"rsi_ok".to_string()));
}

#[test]
fn test_two_node_cycle_detected() {
    let cfg = config(json!({
        "rules": {
            "a": { "kind": "alias", "name": "b" },
            "b": { "kind": "alias", "name": "a" }
        },
        "timeframes": {
            "15m": { "long": ["a"], "short": [] }
        }
    }));
    let issues = ConsistencyChecker::new(&cfg).check();
    let circular: Vec<_> =
        issues.iter().filter(|i| i.kind == IssueKind::CircularDependency).collect();
    assert_eq!(circular.len(), 1);
    assert_eq!(circular[0].affected_rules, vec!["a", "b"]);
}

#[test]
fn test_conflicting_threshold_band() {
    let cfg = config(json!({
        "rules": {
            "bad_band": {
                "kind": "field_threshold", "field": "adx", "op": "gt", "value": 20.0,
                "min": 30.0, "max": 10.0
            }
        },
        "timeframes": {
            "15m": { "long": ["bad_band"], "short": [] }
        }
    }));
    let issues = ConsistencyChecker::new(&cfg).check();
    let conflicting: Vec<_> =
        issues.iter().filter(|i| i.kind == IssueKind::ConflictingThreshold).collect();
    assert_eq!(conflicting.len(), 1);
    assert_eq!(conflicting[0].affected_rules, vec!["bad_band"]);
}

#[test]
fn test_conflicting_band_found_in_filters_and_guards() {
    let cfg = config(json!({
        "rules": {
            "macd_up": { "kind": "field_threshold", "field": "macd_hist", "op": "gt", "value": 0.0 }
        },
        "timeframes": {
            "15m": { "long": ["macd_up"], "short": [] }
        },
        "filters_mandatory": [{
            "kind": "field_threshold", "field": "volume_usd", "op": "gt", "value": 0.0,
            "min": 5.0, "max": 1.0
        }],
        "execution_selector": {
            "guards": [{
                "kind": "field_threshold", "field": "rsi", "op": "lt", "value": 70.0,
                "min": 60.0, "max": 40.0
            }]
        }
    }));
    let issues = ConsistencyChecker::new(&cfg).check();
    let conflicting: Vec<_> =
        issues.iter().filter(|i| i.kind == IssueKind::ConflictingThreshold).collect();
    assert_eq!(conflicting.len(), 2);
    assert_eq!(conflicting[0].affected_rules, vec!["filters_mandatory[0]"]);
    assert_eq!(conflicting[1].affected_rules, vec!["execution_selector.guards[0]"]);
}

#[test]
fn test_issue_categories_are_ordered() {
    // One defect of each category; output must group by category in the
    // documented order.
    let cfg = config(json!({
        "rules": {
            "a": { "kind": "alias", "name": "b" },
            "b": { "kind": "alias", "name": "a" },
            "bad_band": {
                "kind": "field_threshold", "field": "adx", "op": "gt", "value": 20.0,
                "min": 30.0, "max": 10.0
            },
            "orphan": { "kind": "field_threshold", "field": "x", "op": "gt", "value": 0.0 },
            "trend_up": { "kind": "field_threshold", "field": "ema_slope", "op": "gt", "value": 0.0 },
            "trend_down": { "kind": "field_threshold", "field": "ema_slope", "op": "lt", "value": 0.0 }
        },
        "timeframes": {
            "15m": { "long": ["a", "bad_band", "trend_up", "trend_down"], "short": [] }
        },
        "conflict_pairs": [["trend_up", "trend_down"]]
    }));
    let issues = ConsistencyChecker::new(&cfg).check();
    let kinds: Vec<_> = issues.iter().map(|i| i.kind).collect();
    let first_unreachable = kinds.iter().position(|k| *k == IssueKind::UnreachableRule);
    let first_circular = kinds.iter().position(|k| *k == IssueKind::CircularDependency);
    let first_contradiction = kinds.iter().position(|k| *k == IssueKind::Contradiction);
    let first_conflicting = kinds.iter().position(|k| *k == IssueKind::ConflictingThreshold);
    assert!(first_contradiction < first_circular);
    assert!(first_circular < first_unreachable);
    assert!(first_unreachable < first_conflicting);
}
