//! Per-symbol processing.
//!
//! Drives one symbol through the timeframe cascade. Everything that can go
//! wrong here is converted into an `ERROR` result; a single symbol's
//! failure never reaches the orchestrator as an error.

use crate::core::context::RunContext;
use crate::errors::DomainError;
use crate::execution::selector::ExecutionSelector;
use crate::models::context::IndicatorContext;
use crate::models::decision::{SymbolResult, SymbolStatus};
use crate::models::run::MtfRunDto;
use crate::rules::timeframe::{TimeframeEvaluation, TimeframeRuleEvaluator};
use std::sync::Arc;
use tracing::{debug, error, info};

#[derive(Clone)]
pub struct SymbolProcessor {
    ctx: Arc<RunContext>,
}

impl SymbolProcessor {
    pub fn new(ctx: Arc<RunContext>) -> Self {
        Self { ctx }
    }

    /// Process one symbol. Infallible by contract: domain failures become
    /// `ERROR` results.
    pub async fn process_symbol(&self, symbol: &str, run_id: &str, run: &MtfRunDto) -> SymbolResult {
        match self.process_inner(symbol, run_id, run).await {
            Ok(result) => result,
            Err(e) => {
                error!(symbol = %symbol, run_id = %run_id, error = %e, "symbol processing failed");
                SymbolResult::error(symbol, e.to_string(), Some("processing"))
            }
        }
    }

    async fn process_inner(
        &self,
        symbol: &str,
        run_id: &str,
        run: &MtfRunDto,
    ) -> Result<SymbolResult, DomainError> {
        let config = &self.ctx.validation;
        let cascade = match (&run.current_tf, run.force_timeframe_check) {
            (Some(tf), true) => vec![tf.clone()],
            _ => config.active_cascade(),
        };
        if cascade.is_empty() {
            return Err(format!("no timeframes configured for '{symbol}'").into());
        }

        let evaluator = TimeframeRuleEvaluator::new(config);
        let mut last_ctx: Option<IndicatorContext> = None;

        for timeframe in &cascade {
            let ictx = self.ctx.indicators.build_context(symbol, timeframe).await?;
            if !run.skip_context_validation && ictx.values.is_empty() {
                return Err(format!("empty indicator context for '{symbol}' on {timeframe}").into());
            }

            let evaluation = self.evaluate(&evaluator, timeframe, &ictx, run).await?;
            debug!(
                symbol = %symbol,
                timeframe = %timeframe,
                status = ?evaluation.decision.status,
                side = ?evaluation.decision.side,
                reason = ?evaluation.decision.reason,
                "cascade step"
            );

            if evaluation.decision.is_valid() {
                return Ok(self.confirm(symbol, run_id, ictx, evaluation));
            }
            last_ctx = Some(ictx);
        }

        let mut result = SymbolResult::new(symbol, SymbolStatus::Success);
        if let Some(ictx) = last_ctx {
            result.current_price = ictx.price();
            result.atr = ictx.get("atr");
            result.context = Some(ictx);
        }
        Ok(result)
    }

    /// Evaluate one timeframe, preferring the indicator engine's delegated
    /// verdict when it offers one.
    async fn evaluate(
        &self,
        evaluator: &TimeframeRuleEvaluator<'_>,
        timeframe: &str,
        ictx: &IndicatorContext,
        run: &MtfRunDto,
    ) -> Result<TimeframeEvaluation, DomainError> {
        match self.ctx.indicators.evaluate_timeframe(timeframe, ictx).await? {
            Some(verdict) => Ok(evaluator.evaluate_with_verdict(
                timeframe,
                ictx,
                verdict.long,
                verdict.short,
                run.side_hint,
            )),
            None => Ok(evaluator.evaluate(timeframe, ictx, run.side_hint)),
        }
    }

    /// A confirmed signal: pick the execution timeframe and build the
    /// ready result.
    fn confirm(
        &self,
        symbol: &str,
        run_id: &str,
        ictx: IndicatorContext,
        evaluation: TimeframeEvaluation,
    ) -> SymbolResult {
        let selector = ExecutionSelector::new(&self.ctx.validation);
        let execution = selector.decide(&ictx);

        info!(
            symbol = %symbol,
            run_id = %run_id,
            timeframe = %evaluation.decision.timeframe,
            side = ?evaluation.decision.side,
            execution_tf = %execution.execution_timeframe,
            "signal confirmed"
        );

        let mut result = SymbolResult::new(symbol, SymbolStatus::Ready);
        result.signal_side = evaluation.decision.side;
        result.current_price = ictx.price();
        result.atr = ictx.get("atr");
        if !execution.is_vetoed() {
            result.execution_tf = Some(execution.execution_timeframe.clone());
        }
        result.context = Some(ictx);
        result
    }
}
