//! Audit trail seam.

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

pub const ACTION_MTF_RUN_COMPLETED: &str = "MTF_RUN_COMPLETED";
pub const ACTION_TRADE_ENTRY_EXECUTED: &str = "TRADE_ENTRY_EXECUTED";
pub const ACTION_TRADE_ENTRY_FAILED: &str = "TRADE_ENTRY_FAILED";

/// Append-only audit log. Logging must never fail the run, so the contract
/// is infallible; implementations swallow and report their own errors.
#[async_trait]
pub trait AuditLogger: Send + Sync {
    async fn log_action(&self, action: &str, entity_type: &str, entity_id: &str, payload: Value);
}

/// Emits audit entries as structured tracing events under the `audit`
/// target.
pub struct TracingAuditLogger;

#[async_trait]
impl AuditLogger for TracingAuditLogger {
    async fn log_action(&self, action: &str, entity_type: &str, entity_id: &str, payload: Value) {
        info!(
            target: "audit",
            action = %action,
            entity_type = %entity_type,
            entity_id = %entity_id,
            payload = %payload,
            "audit entry"
        );
    }
}
