//! Environment-driven runtime settings.
//!
//! The validation rule set is loaded separately (see
//! [`crate::models::validation::ValidationConfig`]); this module only covers
//! the operational knobs: lock TTL and retry policy, trade cooldown, and the
//! global feature-switch key.

use std::env;

/// Returns the deployment environment (`production`, `sandbox`, ...).
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

/// Operational settings with per-deployment env overrides.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Feature switch consulted before any non-forced run.
    pub global_switch_key: String,
    /// TTL handed to the lock collaborator, in seconds.
    pub lock_ttl_seconds: u64,
    /// Total lock acquisition attempts before giving up.
    pub lock_retries: usize,
    /// Spacing between lock acquisition attempts.
    pub lock_backoff_ms: u64,
    /// Post-trade re-evaluation suppression window.
    pub cooldown_minutes: i64,
    /// Order type stamped on execution requests.
    pub order_type: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            global_switch_key: "mtf_execution_enabled".to_string(),
            lock_ttl_seconds: 300,
            lock_retries: 3,
            lock_backoff_ms: 100,
            cooldown_minutes: 15,
            order_type: "market".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();
        Self {
            global_switch_key: env::var("MTF_GLOBAL_SWITCH_KEY")
                .unwrap_or(defaults.global_switch_key),
            lock_ttl_seconds: env_parse("MTF_LOCK_TTL_SECONDS", defaults.lock_ttl_seconds),
            lock_retries: env_parse("MTF_LOCK_RETRIES", defaults.lock_retries),
            lock_backoff_ms: env_parse("MTF_LOCK_BACKOFF_MS", defaults.lock_backoff_ms),
            cooldown_minutes: env_parse("MTF_COOLDOWN_MINUTES", defaults.cooldown_minutes),
            order_type: env::var("MTF_ORDER_TYPE").unwrap_or(defaults.order_type),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}
