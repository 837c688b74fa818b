//! Run parameters, progress events and summaries.

use crate::models::decision::{Side, SymbolResult, SymbolStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Parameters of one orchestrated run. Immutable per invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MtfRunDto {
    pub symbols: Vec<String>,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub force_run: bool,
    /// Restrict the cascade to `current_tf` instead of walking all
    /// configured timeframes.
    #[serde(default)]
    pub force_timeframe_check: bool,
    #[serde(default)]
    pub lock_per_symbol: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_tf: Option<String>,
    #[serde(default)]
    pub skip_context_validation: bool,
    /// Preferred side when both rule trees pass on the same timeframe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side_hint: Option<Side>,
}

impl Default for MtfRunDto {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            dry_run: false,
            force_run: false,
            force_timeframe_check: false,
            lock_per_symbol: false,
            current_tf: None,
            skip_context_validation: false,
            side_hint: None,
        }
    }
}

impl MtfRunDto {
    pub fn for_symbols(symbols: Vec<String>) -> Self {
        Self { symbols, ..Self::default() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    GlobalSwitchOff,
    NoActiveSymbols,
    LockAcquisitionFailed,
}

/// Progress attached to each per-symbol event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    pub percentage: f64,
    pub status: SymbolStatus,
}

/// One element of the run's event stream; the stream always terminates with
/// a single `Summary`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    Symbol {
        symbol: String,
        result: SymbolResult,
        progress: Progress,
    },
    Summary(RunSummary),
}

/// Aggregate outcome of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub symbols_processed: usize,
    pub symbols_successful: usize,
    pub symbols_failed: usize,
    pub symbols_skipped: usize,
    /// Successful share of processed symbols, in percent.
    pub success_rate: f64,
    pub dry_run: bool,
    pub force_run: bool,
    pub duration_ms: u64,
}

impl RunSummary {
    pub fn gated(
        run_id: impl Into<String>,
        status: RunStatus,
        started_at: DateTime<Utc>,
        dto: &MtfRunDto,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            status,
            started_at,
            symbols_processed: 0,
            symbols_successful: 0,
            symbols_failed: 0,
            symbols_skipped: 0,
            success_rate: 0.0,
            dry_run: dto.dry_run,
            force_run: dto.force_run,
            duration_ms: 0,
        }
    }
}
