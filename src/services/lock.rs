//! Distributed lock seam.
//!
//! Mutual exclusion across concurrent runs relies entirely on the lock
//! collaborator; the core holds no long-lived in-process locks. Lock errors
//! are infrastructure errors and abort the run.

use crate::errors::CoreError;
use async_trait::async_trait;
use backon::{ConstantBuilder, Retryable};
use redis::aio::ConnectionManager;
use std::time::Duration;
use tracing::debug;

/// Key serializing a whole run; per-symbol keys append `:<symbol>`.
pub const GLOBAL_LOCK_KEY: &str = "mtf_execution";

/// Build the lock key for one symbol.
pub fn symbol_lock_key(symbol: &str) -> String {
    format!("{GLOBAL_LOCK_KEY}:{symbol}")
}

#[async_trait]
pub trait LockManager: Send + Sync {
    /// Try to take the lock once. `Ok(false)` means it is held elsewhere.
    async fn acquire_lock(&self, key: &str, ttl_seconds: u64) -> Result<bool, CoreError>;

    async fn release_lock(&self, key: &str) -> Result<(), CoreError>;
}

enum AcquireAttempt {
    Busy,
    Infra(CoreError),
}

/// Bounded acquisition: `retries` total attempts spaced `backoff_ms` apart.
/// Infrastructure errors abort immediately without retrying.
pub async fn acquire_lock_with_retry(
    locks: &dyn LockManager,
    key: &str,
    ttl_seconds: u64,
    retries: usize,
    backoff_ms: u64,
) -> Result<bool, CoreError> {
    let policy = ConstantBuilder::default()
        .with_delay(Duration::from_millis(backoff_ms))
        .with_max_times(retries.saturating_sub(1));

    let attempt = || async {
        match locks.acquire_lock(key, ttl_seconds).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(AcquireAttempt::Busy),
            Err(e) => Err(AcquireAttempt::Infra(e)),
        }
    };

    match attempt
        .retry(policy)
        .when(|e| matches!(e, AcquireAttempt::Busy))
        .await
    {
        Ok(()) => {
            debug!(key = %key, "lock acquired");
            Ok(true)
        }
        Err(AcquireAttempt::Busy) => {
            debug!(key = %key, "lock busy after retries");
            Ok(false)
        }
        Err(AcquireAttempt::Infra(e)) => Err(e),
    }
}

/// Redis-backed lock manager: `SET key NX EX ttl` / `DEL key`.
pub struct RedisLockManager {
    conn: ConnectionManager,
}

impl RedisLockManager {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    pub async fn connect(redis_url: &str) -> Result<Self, CoreError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| CoreError::Infrastructure(format!("redis client: {e}")))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| CoreError::Infrastructure(format!("redis connect: {e}")))?;
        Ok(Self::new(conn))
    }
}

#[async_trait]
impl LockManager for RedisLockManager {
    async fn acquire_lock(&self, key: &str, ttl_seconds: u64) -> Result<bool, CoreError> {
        let mut conn = self.conn.clone();
        let acquired: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg("locked")
            .arg("NX")
            .arg("EX")
            .arg(ttl_seconds)
            .query_async(&mut conn)
            .await
            .map_err(|e| CoreError::Infrastructure(format!("lock acquire '{key}': {e}")))?;
        Ok(acquired.is_some())
    }

    async fn release_lock(&self, key: &str) -> Result<(), CoreError> {
        let mut conn = self.conn.clone();
        let _: i64 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| CoreError::Infrastructure(format!("lock release '{key}': {e}")))?;
        Ok(())
    }
}
