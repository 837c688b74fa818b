//! Decision and result objects.
//!
//! Success and failure are modeled as data so that a single symbol's problem
//! never surfaces as an error to the run orchestrator.

use crate::models::context::IndicatorContext;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

pub const REASON_NO_LONG_NO_SHORT: &str = "NO_LONG_NO_SHORT";
pub const EXECUTION_TF_NONE: &str = "NONE";

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DecisionStatus {
    Valid,
    Invalid,
}

/// Per-timeframe verdict after reducing the long/short rule trees.
///
/// `status == Valid` implies exactly one non-null `side`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeframeDecision {
    pub timeframe: String,
    pub status: DecisionStatus,
    pub side: Option<Side>,
    pub reason: Option<String>,
}

impl TimeframeDecision {
    pub fn valid(timeframe: impl Into<String>, side: Side) -> Self {
        Self {
            timeframe: timeframe.into(),
            status: DecisionStatus::Valid,
            side: Some(side),
            reason: None,
        }
    }

    pub fn invalid(timeframe: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            timeframe: timeframe.into(),
            status: DecisionStatus::Invalid,
            side: None,
            reason: Some(reason.into()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status == DecisionStatus::Valid
    }
}

/// Outcome of execution-timeframe selection.
///
/// `execution_timeframe != "NONE"` implies all mandatory guards passed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionDecision {
    pub execution_timeframe: String,
    #[serde(default)]
    pub meta: HashMap<String, Value>,
}

impl ExecutionDecision {
    pub fn timeframe(tf: impl Into<String>) -> Self {
        Self { execution_timeframe: tf.into(), meta: HashMap::new() }
    }

    pub fn none() -> Self {
        Self::timeframe(EXECUTION_TF_NONE)
    }

    pub fn with_meta(mut self, key: &str, value: Value) -> Self {
        self.meta.insert(key.to_string(), value);
        self
    }

    pub fn is_vetoed(&self) -> bool {
        self.execution_timeframe == EXECUTION_TF_NONE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SymbolStatus {
    /// Processed to completion without a confirmed signal.
    Success,
    /// A fully confirmed, executable signal exists.
    Ready,
    Error,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeStatus {
    Submitted,
    Skipped,
    Error,
}

/// Trade-entry outcome attached to a symbol result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingDecision {
    pub status: TradeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TradingDecision {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            status: TradeStatus::Skipped,
            reason: Some(reason.into()),
            client_order_id: None,
            exchange_order_id: None,
            error: None,
        }
    }

    pub fn submitted(client_order_id: impl Into<String>, exchange_order_id: impl Into<String>) -> Self {
        Self {
            status: TradeStatus::Submitted,
            reason: None,
            client_order_id: Some(client_order_id.into()),
            exchange_order_id: Some(exchange_order_id.into()),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: TradeStatus::Error,
            reason: None,
            client_order_id: None,
            exchange_order_id: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}

/// Per-symbol outcome of one run. Discarded after the run summary is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolResult {
    pub symbol: String,
    pub status: SymbolStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_tf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_side: Option<Side>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atr: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<IndicatorContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trading_decision: Option<TradingDecision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SymbolError>,
}

impl SymbolResult {
    pub fn new(symbol: impl Into<String>, status: SymbolStatus) -> Self {
        Self {
            symbol: symbol.into(),
            status,
            execution_tf: None,
            signal_side: None,
            current_price: None,
            atr: None,
            context: None,
            trading_decision: None,
            error: None,
        }
    }

    pub fn error(symbol: impl Into<String>, message: impl Into<String>, stage: Option<&str>) -> Self {
        let mut result = Self::new(symbol, SymbolStatus::Error);
        result.error = Some(SymbolError {
            message: message.into(),
            stage: stage.map(str::to_string),
        });
        result
    }

    /// Returns a copy with the trading decision attached.
    pub fn with_trading_decision(mut self, decision: TradingDecision) -> Self {
        self.trading_decision = Some(decision);
        self
    }
}
