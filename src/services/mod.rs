//! Collaborator seams consumed by the core.
//!
//! Each trait models an external system (indicator engine, distributed
//! locks, feature switches, audit trail, trade entry, cooldown switches).
//! Production implementations are Redis-backed where state is shared
//! across processes; tests substitute in-memory fakes.

pub mod audit;
pub mod clock;
pub mod indicator;
pub mod lock;
pub mod switches;
pub mod trade;

pub use audit::{
    AuditLogger, TracingAuditLogger, ACTION_MTF_RUN_COMPLETED, ACTION_TRADE_ENTRY_EXECUTED,
    ACTION_TRADE_ENTRY_FAILED,
};
pub use clock::{Clock, SystemClock};
pub use indicator::{IndicatorEngine, SideVerdict};
pub use lock::{acquire_lock_with_retry, symbol_lock_key, LockManager, RedisLockManager, GLOBAL_LOCK_KEY};
pub use switches::{FeatureSwitch, MtfSwitchRepository, RedisSwitchRepository};
pub use trade::{ExecutionRequest, ExecutionResult, TradeEntryService};
