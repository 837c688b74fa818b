//! Run orchestration: per-symbol processing under lock discipline.

pub mod context;
pub mod orchestrator;
pub mod processor;

pub use context::RunContext;
pub use orchestrator::MtfRunOrchestrator;
pub use processor::SymbolProcessor;
