//! Rule evaluation and static analysis.

pub mod consistency;
pub mod engine;
pub mod timeframe;

pub use consistency::ConsistencyChecker;
pub use engine::RuleEngine;
pub use timeframe::{TimeframeEvaluation, TimeframeRuleEvaluator};
