//! Fatal error taxonomy.
//!
//! Only two failure classes surface as `Err` from this crate: configuration
//! errors raised at load time, and infrastructure errors from the lock or
//! feature-switch collaborators. Per-symbol and trade-entry failures are
//! recovered locally and reported as data on the result DTOs.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed or unparseable validation configuration. Raised before any
    /// run starts; never during evaluation.
    #[error("configuration error: {0}")]
    Config(String),

    /// Lock manager or feature switch failure. Aborts the whole run and
    /// propagates to the caller unmodified.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

/// Recoverable collaborator error, isolated per symbol or per trade.
pub type DomainError = Box<dyn std::error::Error + Send + Sync>;
