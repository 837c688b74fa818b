//! Batch run coordination.
//!
//! Symbols are processed sequentially within a run to keep lock semantics
//! deterministic; mutual exclusion across concurrent runs comes entirely
//! from the lock collaborator. Progress is reported through a bounded
//! channel of [`RunEvent`]s, terminated by a single summary.

use crate::core::context::RunContext;
use crate::core::processor::SymbolProcessor;
use crate::errors::CoreError;
use crate::execution::decision_handler::TradingDecisionHandler;
use crate::models::decision::{SymbolResult, SymbolStatus};
use crate::models::run::{MtfRunDto, Progress, RunEvent, RunStatus, RunSummary};
use crate::services::audit::ACTION_MTF_RUN_COMPLETED;
use crate::services::lock::{acquire_lock_with_retry, symbol_lock_key, GLOBAL_LOCK_KEY};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

const EVENT_CHANNEL_CAPACITY: usize = 32;

#[derive(Default)]
struct RunCounts {
    processed: usize,
    successful: usize,
    failed: usize,
    skipped: usize,
}

#[derive(Clone)]
pub struct MtfRunOrchestrator {
    ctx: Arc<RunContext>,
}

impl MtfRunOrchestrator {
    pub fn new(ctx: Arc<RunContext>) -> Self {
        Self { ctx }
    }

    /// Start a run in the background and stream its events.
    ///
    /// The receiver yields one `Symbol` event per processed symbol, in
    /// input order, followed by a `Summary`. The join handle resolves to
    /// the summary, or to the infrastructure error that aborted the run.
    pub fn run(&self, dto: MtfRunDto) -> (mpsc::Receiver<RunEvent>, JoinHandle<Result<RunSummary, CoreError>>) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let orchestrator = self.clone();
        let run_id = format!("mtf_{}", self.ctx.clock.now().timestamp_millis());
        let handle =
            tokio::spawn(async move { orchestrator.execute(&dto, &run_id, Some(tx)).await });
        (rx, handle)
    }

    /// Execute one run to completion.
    ///
    /// Gating outcomes (switch off, no symbols, lock unavailable) are
    /// terminal summaries, not errors. The only `Err` this returns is an
    /// infrastructure failure from the lock or feature-switch collaborator.
    pub async fn execute(
        &self,
        dto: &MtfRunDto,
        run_id: &str,
        events: Option<mpsc::Sender<RunEvent>>,
    ) -> Result<RunSummary, CoreError> {
        let started = Instant::now();
        let started_at = self.ctx.clock.now();
        let settings = &self.ctx.settings;

        if !dto.force_run {
            let enabled = self.ctx.switches.is_enabled(&settings.global_switch_key).await?;
            if !enabled {
                info!(run_id = %run_id, "global switch off; run not started");
                let summary =
                    RunSummary::gated(run_id, RunStatus::GlobalSwitchOff, started_at, dto);
                return self.finish(summary, events.as_ref()).await;
            }
        }

        let symbols: Vec<String> =
            dto.symbols.iter().filter(|s| !s.is_empty()).cloned().collect();
        if symbols.is_empty() {
            let summary = RunSummary::gated(run_id, RunStatus::NoActiveSymbols, started_at, dto);
            return self.finish(summary, events.as_ref()).await;
        }

        if !dto.lock_per_symbol {
            let acquired = acquire_lock_with_retry(
                &*self.ctx.locks,
                GLOBAL_LOCK_KEY,
                settings.lock_ttl_seconds,
                settings.lock_retries,
                settings.lock_backoff_ms,
            )
            .await?;
            if !acquired {
                warn!(run_id = %run_id, "global lock unavailable; run not started");
                let summary =
                    RunSummary::gated(run_id, RunStatus::LockAcquisitionFailed, started_at, dto);
                return self.finish(summary, events.as_ref()).await;
            }
        }

        // The global lock must be released whatever happens below.
        let outcome = self.process_symbols(dto, run_id, &symbols, events.as_ref()).await;
        if !dto.lock_per_symbol {
            if let Err(e) = self.ctx.locks.release_lock(GLOBAL_LOCK_KEY).await {
                warn!(run_id = %run_id, error = %e, "global lock release failed");
                if outcome.is_ok() {
                    return Err(e);
                }
            }
        }
        let counts = outcome?;

        let processed = counts.processed;
        let success_rate = if processed > 0 {
            round2(counts.successful as f64 / processed as f64 * 100.0)
        } else {
            0.0
        };
        let summary = RunSummary {
            run_id: run_id.to_string(),
            status: RunStatus::Completed,
            started_at,
            symbols_processed: processed,
            symbols_successful: counts.successful,
            symbols_failed: counts.failed,
            symbols_skipped: counts.skipped,
            success_rate,
            dry_run: dto.dry_run,
            force_run: dto.force_run,
            duration_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            run_id = %run_id,
            processed = summary.symbols_processed,
            successful = summary.symbols_successful,
            failed = summary.symbols_failed,
            skipped = summary.symbols_skipped,
            "run completed"
        );
        self.finish(summary, events.as_ref()).await
    }

    async fn process_symbols(
        &self,
        dto: &MtfRunDto,
        run_id: &str,
        symbols: &[String],
        events: Option<&mpsc::Sender<RunEvent>>,
    ) -> Result<RunCounts, CoreError> {
        let settings = &self.ctx.settings;
        let handler = TradingDecisionHandler::new(self.ctx.clone());
        let total = symbols.len();
        let mut counts = RunCounts::default();

        for (i, symbol) in symbols.iter().enumerate() {
            let lock_key = symbol_lock_key(symbol);
            if dto.lock_per_symbol {
                let acquired = acquire_lock_with_retry(
                    &*self.ctx.locks,
                    &lock_key,
                    settings.lock_ttl_seconds,
                    settings.lock_retries,
                    settings.lock_backoff_ms,
                )
                .await?;
                if !acquired {
                    warn!(run_id = %run_id, symbol = %symbol, "symbol lock unavailable; skipping");
                    counts.skipped += 1;
                    continue;
                }
            }

            // Processing runs in its own task so a panic surfaces as a
            // JoinError instead of skipping lock release.
            let result = self.process_one(symbol, run_id, dto).await;
            let result = if dto.dry_run {
                result
            } else {
                handler.handle(result, run_id, dto).await
            };

            if dto.lock_per_symbol {
                self.ctx.locks.release_lock(&lock_key).await?;
            }

            counts.processed += 1;
            match result.status {
                SymbolStatus::Error => counts.failed += 1,
                _ => counts.successful += 1,
            }

            if let Some(tx) = events {
                let progress = Progress {
                    percentage: round2((i + 1) as f64 / total as f64 * 100.0),
                    status: result.status,
                };
                let event = RunEvent::Symbol {
                    symbol: symbol.clone(),
                    result,
                    progress,
                };
                let _ = tx.send(event).await;
            }
        }

        Ok(counts)
    }

    async fn process_one(&self, symbol: &str, run_id: &str, dto: &MtfRunDto) -> SymbolResult {
        let processor = SymbolProcessor::new(self.ctx.clone());
        let symbol_owned = symbol.to_string();
        let run_id_owned = run_id.to_string();
        let dto_owned = dto.clone();
        let handle = tokio::spawn(async move {
            processor.process_symbol(&symbol_owned, &run_id_owned, &dto_owned).await
        });
        match handle.await {
            Ok(result) => result,
            Err(join_err) => SymbolResult::error(
                symbol,
                format!("symbol task aborted: {join_err}"),
                Some("processing"),
            ),
        }
    }

    /// Every run path terminates here: audit the summary and emit the final
    /// event.
    async fn finish(
        &self,
        summary: RunSummary,
        events: Option<&mpsc::Sender<RunEvent>>,
    ) -> Result<RunSummary, CoreError> {
        let payload = serde_json::to_value(&summary).unwrap_or_default();
        self.ctx
            .audit
            .log_action(ACTION_MTF_RUN_COMPLETED, "mtf_run", &summary.run_id, payload)
            .await;
        if let Some(tx) = events {
            let _ = tx.send(RunEvent::Summary(summary.clone())).await;
        }
        Ok(summary)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
