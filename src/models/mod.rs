//! Shared data models spanning the engine layers.

pub mod context;
pub mod decision;
pub mod issue;
pub mod rule;
pub mod run;
pub mod validation;

pub use context::IndicatorContext;
pub use decision::{
    DecisionStatus, ExecutionDecision, Side, SymbolError, SymbolResult, SymbolStatus,
    TimeframeDecision, TradeStatus, TradingDecision, EXECUTION_TF_NONE, REASON_NO_LONG_NO_SHORT,
};
pub use issue::{ConsistencyIssue, IssueKind, Severity};
pub use rule::{CompareOp, Operand, RuleOutcome, RuleOverrides, RuleRef, RuleSpec, ThresholdOp};
pub use run::{MtfRunDto, Progress, RunEvent, RunStatus, RunSummary};
pub use validation::{SelectorConfig, SelectorThresholds, SidePriority, SideRules, ValidationConfig};
