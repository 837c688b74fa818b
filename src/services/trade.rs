//! Trade entry seam.
//!
//! Order placement, sizing arithmetic and the exchange wire protocol live
//! behind this trait; the core only builds the request and records the
//! outcome.

use crate::errors::DomainError;
use crate::models::decision::Side;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Execution request assembled from a ready symbol result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub symbol: String,
    pub side: Side,
    pub order_type: String,
    pub execution_timeframe: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atr: Option<f64>,
    pub run_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub client_order_id: String,
    pub exchange_order_id: String,
    pub status: String,
    #[serde(default)]
    pub raw: Value,
}

#[async_trait]
pub trait TradeEntryService: Send + Sync {
    /// Size and submit the order. May fail; the caller recovers locally.
    async fn build_and_execute(&self, request: &ExecutionRequest)
        -> Result<ExecutionResult, DomainError>;
}
