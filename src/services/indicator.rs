//! Indicator engine seam.
//!
//! Indicator math and kline storage live outside this crate; the core only
//! consumes the flat context the engine builds. The engine may optionally
//! return its own per-side verdict, in which case the symbol processor uses
//! it instead of the in-crate rule evaluator (both paths reduce through the
//! same decision logic).

use crate::errors::DomainError;
use crate::models::context::IndicatorContext;
use async_trait::async_trait;

/// Raw per-side verdict from a delegated evaluation.
#[derive(Debug, Clone, Copy)]
pub struct SideVerdict {
    pub long: bool,
    pub short: bool,
}

#[async_trait]
pub trait IndicatorEngine: Send + Sync {
    /// Build the indicator context for one (symbol, timeframe).
    async fn build_context(
        &self,
        symbol: &str,
        timeframe: &str,
    ) -> Result<IndicatorContext, DomainError>;

    /// Delegated rule evaluation. Return `None` to have the core evaluate
    /// its own rule trees against the context.
    async fn evaluate_timeframe(
        &self,
        _timeframe: &str,
        _ctx: &IndicatorContext,
    ) -> Result<Option<SideVerdict>, DomainError> {
        Ok(None)
    }
}
