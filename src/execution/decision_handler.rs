//! Converts a confirmed signal into an execution request.
//!
//! Every failure path here is recovered locally: a trade-entry error is
//! recorded on the result and must never propagate to the orchestrator.

use crate::core::context::RunContext;
use crate::models::decision::{SymbolResult, SymbolStatus, TradingDecision};
use crate::models::run::MtfRunDto;
use crate::services::audit::{ACTION_TRADE_ENTRY_EXECUTED, ACTION_TRADE_ENTRY_FAILED};
use crate::services::trade::ExecutionRequest;
use chrono::Duration;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct TradingDecisionHandler {
    ctx: Arc<RunContext>,
}

impl TradingDecisionHandler {
    pub fn new(ctx: Arc<RunContext>) -> Self {
        Self { ctx }
    }

    /// Handle one symbol result, returning a new result with the trading
    /// decision attached. Non-ready results pass through unchanged.
    pub async fn handle(&self, result: SymbolResult, run_id: &str, _run: &MtfRunDto) -> SymbolResult {
        if result.status != SymbolStatus::Ready {
            return result;
        }

        let (Some(execution_tf), Some(side)) = (result.execution_tf.clone(), result.signal_side)
        else {
            return result.with_trading_decision(TradingDecision::skipped(
                "trading_conditions_not_met",
            ));
        };

        let request = ExecutionRequest {
            symbol: result.symbol.clone(),
            side,
            order_type: self.ctx.settings.order_type.clone(),
            execution_timeframe: execution_tf,
            current_price: result.current_price,
            atr: result.atr,
            run_id: run_id.to_string(),
        };

        match self.ctx.trade_entry.build_and_execute(&request).await {
            Ok(executed) => {
                info!(
                    symbol = %request.symbol,
                    side = ?request.side,
                    client_order_id = %executed.client_order_id,
                    "trade entry submitted"
                );
                self.ctx
                    .audit
                    .log_action(
                        ACTION_TRADE_ENTRY_EXECUTED,
                        "symbol",
                        &request.symbol,
                        json!({
                            "run_id": run_id,
                            "side": request.side,
                            "execution_timeframe": request.execution_timeframe,
                            "client_order_id": executed.client_order_id,
                            "exchange_order_id": executed.exchange_order_id,
                        }),
                    )
                    .await;

                // Suppress immediate re-entry thrash on this symbol.
                let window = Duration::minutes(self.ctx.settings.cooldown_minutes);
                if let Err(e) = self.ctx.cooldown.turn_off_symbol_for(&request.symbol, window).await
                {
                    warn!(symbol = %request.symbol, error = %e, "failed to arm cooldown switch");
                }

                result.with_trading_decision(TradingDecision::submitted(
                    executed.client_order_id,
                    executed.exchange_order_id,
                ))
            }
            Err(e) => {
                error!(symbol = %request.symbol, error = %e, "trade entry failed");
                self.ctx
                    .audit
                    .log_action(
                        ACTION_TRADE_ENTRY_FAILED,
                        "symbol",
                        &request.symbol,
                        json!({ "run_id": run_id, "error": e.to_string() }),
                    )
                    .await;
                result.with_trading_decision(TradingDecision::error(e.to_string()))
            }
        }
    }
}
