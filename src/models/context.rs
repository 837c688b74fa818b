//! Flat per-(symbol, timeframe) indicator context.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Read-only numeric indicator snapshot built by the external indicator
/// engine. Keys are indicator names (`rsi`, `macd_hist`, `ema.20`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorContext {
    pub symbol: String,
    pub timeframe: String,
    #[serde(default)]
    pub values: HashMap<String, f64>,
}

impl IndicatorContext {
    pub fn new(symbol: impl Into<String>, timeframe: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe: timeframe.into(),
            values: HashMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Last traded price, under either of the conventional keys.
    pub fn price(&self) -> Option<f64> {
        self.get("close").or_else(|| self.get("price"))
    }
}
