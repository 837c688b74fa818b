//! Unit tests for execution-timeframe selection

use signatrix::execution::ExecutionSelector;
use signatrix::models::{IndicatorContext, ValidationConfig, EXECUTION_TF_NONE};
use serde_json::json;

fn selector_config() -> ValidationConfig {
    ValidationConfig::from_json(
        &json!({
            "rules": {
                "rsi_not_overbought": { "kind": "field_threshold", "field": "rsi", "op": "lt", "value": 70.0 }
            },
            "execution_selector": {
                "guards": ["rsi_not_overbought"],
                "context_timeframe": "15m",
                "fast_timeframe": "5m",
                "thresholds": {
                    "min_r_multiple": 2.0,
                    "max_entry_zone_width_pct": 1.2,
                    "max_atr_pct_15m_bps": 120.0,
                    "adx_floor": 18.0,
                    "spread_bps_ceiling": 8.0
                }
            }
        })
        .to_string(),
    )
    .expect("valid config")
}

fn base_ctx() -> IndicatorContext {
    IndicatorContext::new("BTCUSDT", "15m").with("rsi", 55.0)
}

#[test]
fn test_high_quality_setup_stays_on_context_timeframe() {
    let cfg = selector_config();
    let decision = ExecutionSelector::new(&cfg).decide(
        &base_ctx()
            .with("expected_r_multiple", 2.5)
            .with("entry_zone_width_pct", 1.0)
            .with("atr_pct_15m_bps", 100.0),
    );
    assert_eq!(decision.execution_timeframe, "15m");
    assert_eq!(decision.meta["reason"], json!("high_quality_setup"));
}

#[test]
fn test_loose_setup_drops_to_fast_timeframe() {
    let cfg = selector_config();
    let decision = ExecutionSelector::new(&cfg).decide(
        &base_ctx()
            .with("expected_r_multiple", 1.5)
            .with("entry_zone_width_pct", 1.5)
            .with("atr_pct_15m_bps", 150.0),
    );
    assert_eq!(decision.execution_timeframe, "5m");
}

#[test]
fn test_weak_trend_forbids_the_drop() {
    let cfg = selector_config();
    let decision = ExecutionSelector::new(&cfg).decide(
        &base_ctx()
            .with("expected_r_multiple", 1.5)
            .with("adx_5m", 15.0),
    );
    assert_eq!(decision.execution_timeframe, "15m");
    assert_eq!(decision.meta["reason"], json!("fast_guards_failed"));
}

#[test]
fn test_wide_spread_forbids_the_drop() {
    let cfg = selector_config();
    let decision = ExecutionSelector::new(&cfg).decide(
        &base_ctx()
            .with("expected_r_multiple", 1.5)
            .with("adx_5m", 25.0)
            .with("spread_bps", 12.0),
    );
    assert_eq!(decision.execution_timeframe, "15m");
}

#[test]
fn test_mandatory_guard_failure_vetoes_regardless_of_quality() {
    let cfg = selector_config();
    let decision = ExecutionSelector::new(&cfg).decide(
        &IndicatorContext::new("BTCUSDT", "15m")
            .with("rsi", 75.0)
            .with("expected_r_multiple", 2.5)
            .with("entry_zone_width_pct", 1.0)
            .with("atr_pct_15m_bps", 100.0),
    );
    assert_eq!(decision.execution_timeframe, EXECUTION_TF_NONE);
    assert!(decision.is_vetoed());
    assert_eq!(decision.meta["reason"], json!("mandatory_filter_failed"));
    assert_eq!(decision.meta["failed_guard"], json!("rsi_not_overbought"));
}

#[test]
fn test_thresholds_come_from_config_not_constants() {
    // Same context, stricter R requirement: the setup is no longer high
    // quality and drops instead.
    let cfg = ValidationConfig::from_json(
        &json!({
            "execution_selector": {
                "thresholds": {
                    "min_r_multiple": 3.0,
                    "max_entry_zone_width_pct": 1.2,
                    "max_atr_pct_15m_bps": 120.0,
                    "adx_floor": 18.0,
                    "spread_bps_ceiling": 8.0
                }
            }
        })
        .to_string(),
    )
    .expect("valid config");
    let decision = ExecutionSelector::new(&cfg).decide(
        &base_ctx()
            .with("expected_r_multiple", 2.5)
            .with("entry_zone_width_pct", 1.0)
            .with("atr_pct_15m_bps", 100.0)
            .with("adx_5m", 25.0)
            .with("spread_bps", 4.0),
    );
    assert_eq!(decision.execution_timeframe, "5m");
}
