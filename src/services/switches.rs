//! Feature switches and the post-trade cooldown switch.

use crate::errors::{CoreError, DomainError};
use async_trait::async_trait;
use chrono::Duration;
use redis::aio::ConnectionManager;
use tracing::debug;

/// Global run gating. A switch failure is infrastructure-level and aborts
/// the run.
#[async_trait]
pub trait FeatureSwitch: Send + Sync {
    async fn is_enabled(&self, key: &str) -> Result<bool, CoreError>;
}

/// Time-boxed per-symbol suppression after a trade. Failures here are
/// recovered locally; a missed cooldown must not undo a submitted trade.
#[async_trait]
pub trait MtfSwitchRepository: Send + Sync {
    async fn turn_off_symbol_for(&self, symbol: &str, window: Duration) -> Result<(), DomainError>;
}

/// Redis-backed implementation of both switch seams.
///
/// Feature switches are plain keys whose value `"off"`/`"0"`/`"false"`
/// disables the feature; absence means enabled. Cooldowns are keys with a
/// TTL matching the suppression window.
pub struct RedisSwitchRepository {
    conn: ConnectionManager,
}

impl RedisSwitchRepository {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    fn cooldown_key(symbol: &str) -> String {
        format!("mtf_cooldown:{symbol}")
    }
}

#[async_trait]
impl FeatureSwitch for RedisSwitchRepository {
    async fn is_enabled(&self, key: &str) -> Result<bool, CoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| CoreError::Infrastructure(format!("feature switch '{key}': {e}")))?;
        Ok(!matches!(value.as_deref(), Some("off") | Some("0") | Some("false")))
    }
}

#[async_trait]
impl MtfSwitchRepository for RedisSwitchRepository {
    async fn turn_off_symbol_for(&self, symbol: &str, window: Duration) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        let key = Self::cooldown_key(symbol);
        let ttl = window.num_seconds().max(1);
        let _: String = redis::cmd("SET")
            .arg(&key)
            .arg("off")
            .arg("EX")
            .arg(ttl)
            .query_async(&mut conn)
            .await?;
        debug!(symbol = %symbol, ttl_seconds = ttl, "cooldown switch armed");
        Ok(())
    }
}
