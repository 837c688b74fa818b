//! Per-timeframe, per-side rule tree evaluation.

use crate::models::context::IndicatorContext;
use crate::models::decision::{Side, TimeframeDecision, REASON_NO_LONG_NO_SHORT};
use crate::models::rule::RuleRef;
use crate::models::validation::ValidationConfig;
use crate::rules::engine::RuleEngine;
use tracing::debug;

/// Verdict for one timeframe before and after reduction.
#[derive(Debug, Clone)]
pub struct TimeframeEvaluation {
    pub decision: TimeframeDecision,
    pub long_passed: bool,
    pub short_passed: bool,
    /// Label of the first failing mandatory filter, if any.
    pub mandatory_failed: Option<String>,
}

pub struct TimeframeRuleEvaluator<'a> {
    config: &'a ValidationConfig,
    engine: RuleEngine<'a>,
}

impl<'a> TimeframeRuleEvaluator<'a> {
    pub fn new(config: &'a ValidationConfig) -> Self {
        Self { config, engine: RuleEngine::new(config) }
    }

    /// Evaluate both side rule lists plus the mandatory filters for one
    /// timeframe and reduce to a decision.
    pub fn evaluate(
        &self,
        timeframe: &str,
        ctx: &IndicatorContext,
        side_hint: Option<Side>,
    ) -> TimeframeEvaluation {
        let mandatory_failed = self.first_failing_mandatory(ctx);

        let (long_passed, short_passed) = match self.config.side_rules(timeframe) {
            Some(rules) => (
                self.side_passes(&rules.long, ctx),
                self.side_passes(&rules.short, ctx),
            ),
            None => (false, false),
        };

        debug!(
            symbol = %ctx.symbol,
            timeframe = %timeframe,
            long = long_passed,
            short = short_passed,
            mandatory_failed = ?mandatory_failed,
            "timeframe rules evaluated"
        );

        let decision = self.reduce(timeframe, long_passed, short_passed, mandatory_failed.as_deref(), side_hint);
        TimeframeEvaluation { decision, long_passed, short_passed, mandatory_failed }
    }

    /// Reduce a delegated per-side verdict. Mandatory filters still apply
    /// here; delegation only replaces the side rule trees.
    pub fn evaluate_with_verdict(
        &self,
        timeframe: &str,
        ctx: &IndicatorContext,
        long_passed: bool,
        short_passed: bool,
        side_hint: Option<Side>,
    ) -> TimeframeEvaluation {
        let mandatory_failed = self.first_failing_mandatory(ctx);
        let decision = self.reduce(timeframe, long_passed, short_passed, mandatory_failed.as_deref(), side_hint);
        TimeframeEvaluation { decision, long_passed, short_passed, mandatory_failed }
    }

    /// Reduce raw side verdicts to a decision. Public so that a delegated
    /// evaluation path (external indicator engine) reduces identically.
    pub fn reduce(
        &self,
        timeframe: &str,
        long_passed: bool,
        short_passed: bool,
        mandatory_failed: Option<&str>,
        side_hint: Option<Side>,
    ) -> TimeframeDecision {
        // A failed mandatory filter vetoes both sides regardless of their
        // own results.
        if let Some(filter) = mandatory_failed {
            return TimeframeDecision::invalid(
                timeframe,
                format!("MANDATORY_FILTER_FAILED:{filter}"),
            );
        }

        match (long_passed, short_passed) {
            (true, false) => TimeframeDecision::valid(timeframe, Side::Long),
            (false, true) => TimeframeDecision::valid(timeframe, Side::Short),
            (true, true) => {
                let side = side_hint.unwrap_or_else(|| self.config.side_priority.preferred());
                TimeframeDecision::valid(timeframe, side)
            }
            (false, false) => TimeframeDecision::invalid(timeframe, REASON_NO_LONG_NO_SHORT),
        }
    }

    /// A side passes iff every top-level rule in its list passes.
    fn side_passes(&self, rules: &[RuleRef], ctx: &IndicatorContext) -> bool {
        !rules.is_empty() && rules.iter().all(|rule| self.engine.evaluate_ref(rule, ctx).passed)
    }

    fn first_failing_mandatory(&self, ctx: &IndicatorContext) -> Option<String> {
        self.config
            .filters_mandatory
            .iter()
            .find(|filter| !self.engine.evaluate_ref(filter, ctx).passed)
            .map(RuleRef::label)
    }
}
