//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

/// Redis transport for the user cache.
///
/// Uses connection pooling via `ConnectionManager` for efficient connection reuse.
/// Every command is bounded by `op_timeout` so a stalled Redis degrades to a
/// cache miss instead of holding the request.
pub struct RedisCache {
    client: ConnectionManager,
    op_timeout: Duration,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid or the
    /// connection cannot be established, and [`CacheError::Timeout`] if either
    /// step exceeds `op_timeout`.
    pub async fn connect(redis_url: &str, op_timeout: Duration) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = timeout(op_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| CacheError::Timeout(op_timeout.as_millis() as u64))?
            .map_err(|e| {
                CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
            })?;

        let cache = Self {
            client: manager,
            op_timeout,
        };

        if !cache.ping().await {
            return Err(CacheError::ConnectionError("Redis PING failed".to_string()));
        }

        info!("✓ Connected to Redis");
        Ok(cache)
    }

    /// Runs a Redis command under the configured timeout.
    async fn bounded<T, F>(&self, op: F) -> CacheResult<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match timeout(self.op_timeout, op).await {
            Ok(result) => result.map_err(|e| CacheError::OperationError(e.to_string())),
            Err(_) => Err(CacheError::Timeout(self.op_timeout.as_millis() as u64)),
        }
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.client.clone();
        self.bounded(conn.get::<_, Option<String>>(key)).await
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> CacheResult<()> {
        let mut conn = self.client.clone();
        self.bounded(conn.set_ex::<_, _, ()>(key, value, ttl_seconds))
            .await?;
        debug!(key, ttl_seconds, "Redis SET");
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.client.clone();
        let deleted = self.bounded(conn.del::<_, i64>(key)).await?;
        debug!(key, deleted, "Redis DEL");
        Ok(())
    }

    async fn ping(&self) -> bool {
        let mut conn = self.client.clone();
        self.bounded(redis::cmd("PING").query_async::<String>(&mut conn))
            .await
            .is_ok()
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
