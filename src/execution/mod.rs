//! Execution-timeframe selection and trade decision handling.

pub mod decision_handler;
pub mod selector;

pub use decision_handler::TradingDecisionHandler;
pub use selector::ExecutionSelector;
