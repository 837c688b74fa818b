//! Execution-timeframe selection.
//!
//! Given an enriched context, pick the fastest timeframe that is still safe
//! to act on, or veto execution entirely. Every bound comes from
//! [`SelectorThresholds`] so deployments can tune without code changes.

use crate::models::context::IndicatorContext;
use crate::models::decision::ExecutionDecision;
use crate::models::validation::ValidationConfig;
use crate::rules::engine::RuleEngine;
use serde_json::json;
use tracing::debug;

pub struct ExecutionSelector<'a> {
    config: &'a ValidationConfig,
    engine: RuleEngine<'a>,
}

impl<'a> ExecutionSelector<'a> {
    pub fn new(config: &'a ValidationConfig) -> Self {
        Self { config, engine: RuleEngine::new(config) }
    }

    /// Decide the execution timeframe for an enriched context.
    pub fn decide(&self, ctx: &IndicatorContext) -> ExecutionDecision {
        let selector = &self.config.execution_selector;

        // Mandatory guards veto everything else.
        for guard in &selector.guards {
            if !self.engine.evaluate_ref(guard, ctx).passed {
                debug!(symbol = %ctx.symbol, guard = %guard.label(), "execution vetoed by guard");
                return ExecutionDecision::none()
                    .with_meta("reason", json!("mandatory_filter_failed"))
                    .with_meta("failed_guard", json!(guard.label()));
            }
        }

        let t = &selector.thresholds;

        // A high-quality, tight, high-R setup executes on the context
        // timeframe; there is no edge in chasing a faster entry.
        let r_multiple = ctx.get("expected_r_multiple");
        let high_r = r_multiple.map(|r| r >= t.min_r_multiple).unwrap_or(false);
        let tight_zone = ctx
            .get("entry_zone_width_pct")
            .map(|w| w <= t.max_entry_zone_width_pct)
            .unwrap_or(true);
        let tight_atr = ctx
            .get("atr_pct_15m_bps")
            .map(|a| a <= t.max_atr_pct_15m_bps)
            .unwrap_or(true);

        if high_r && tight_zone && tight_atr {
            return ExecutionDecision::timeframe(&selector.context_timeframe)
                .with_meta("reason", json!("high_quality_setup"));
        }

        // Dropping to the fast timeframe needs enough trend strength and a
        // sane spread; otherwise stay where the context was built.
        let adx_ok = ctx.get("adx_5m").map(|adx| adx >= t.adx_floor).unwrap_or(true);
        let spread_ok = ctx
            .get("spread_bps")
            .map(|s| s <= t.spread_bps_ceiling)
            .unwrap_or(true);

        if adx_ok && spread_ok {
            ExecutionDecision::timeframe(&selector.fast_timeframe)
                .with_meta("reason", json!("dropped_to_fast_timeframe"))
        } else {
            ExecutionDecision::timeframe(&selector.context_timeframe)
                .with_meta("reason", json!("fast_guards_failed"))
                .with_meta("adx_ok", json!(adx_ok))
                .with_meta("spread_ok", json!(spread_ok))
        }
    }
}
