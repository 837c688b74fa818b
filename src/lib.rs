//! Multi-timeframe signal validation and run orchestration core.
//!
//! The crate evaluates streaming market data against a declarative,
//! multi-timeframe rule set and hands validated signals to an execution
//! layer, with per-symbol mutual exclusion across concurrent runs.
//!
//! Layers, leaves first:
//! - `models`: rule specs, validation config, decisions, run DTOs
//! - `rules`: rule engine, per-timeframe evaluation, static consistency checks
//! - `execution`: execution-timeframe selection and trade decision handling
//! - `core`: per-symbol processing and run orchestration
//! - `services`: collaborator seams (indicators, locks, switches, audit, trades)

pub mod config;
pub mod core;
pub mod errors;
pub mod execution;
pub mod logging;
pub mod models;
pub mod rules;
pub mod services;
