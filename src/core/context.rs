//! Dependency container passed into the orchestration layer.

use crate::config::Settings;
use crate::models::validation::ValidationConfig;
use crate::services::audit::AuditLogger;
use crate::services::clock::Clock;
use crate::services::indicator::IndicatorEngine;
use crate::services::lock::LockManager;
use crate::services::switches::{FeatureSwitch, MtfSwitchRepository};
use crate::services::trade::TradeEntryService;
use std::sync::Arc;

/// Read-only access to the validation config and every collaborator a run
/// needs. Built once and shared; concurrent runs may hold different
/// configs in the same process.
pub struct RunContext {
    pub validation: Arc<ValidationConfig>,
    pub indicators: Arc<dyn IndicatorEngine>,
    pub locks: Arc<dyn LockManager>,
    pub switches: Arc<dyn FeatureSwitch>,
    pub audit: Arc<dyn AuditLogger>,
    pub trade_entry: Arc<dyn TradeEntryService>,
    pub cooldown: Arc<dyn MtfSwitchRepository>,
    pub clock: Arc<dyn Clock>,
    pub settings: Settings,
}
