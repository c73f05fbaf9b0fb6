//! Typed, fail-soft user cache on top of a [`CacheService`] transport.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use super::service::CacheService;
use crate::domain::entities::UserProjection;

/// Default lifetime of a cached user entry.
pub const DEFAULT_USER_TTL_SECONDS: u64 = 3600;

/// Cache of [`UserProjection`]s keyed by `user:<id>`.
///
/// Every operation fails soft: transport and (de)serialization errors are
/// logged and counted, then surface to the caller as a miss or a no-op. The cache
/// is never a source of truth, so an absent entry only means "ask the store".
pub struct UserCache {
    backend: Arc<dyn CacheService>,
    ttl_seconds: u64,
}

impl UserCache {
    pub fn new(backend: Arc<dyn CacheService>, ttl_seconds: u64) -> Self {
        Self {
            backend,
            ttl_seconds,
        }
    }

    /// Cache key for a user id.
    pub fn key(id: Uuid) -> String {
        format!("user:{}", id)
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    pub fn backend(&self) -> &'static str {
        self.backend.backend()
    }

    /// Looks up a cached projection. Errors and undecodable entries count as misses.
    pub async fn get(&self, id: Uuid) -> Option<UserProjection> {
        let key = Self::key(id);

        let raw = match self.backend.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(%key, "Cache MISS");
                metrics::counter!("user_cache_lookups_total", "result" => "miss").increment(1);
                return None;
            }
            Err(e) => {
                warn!(%key, error = %e, "Cache GET failed, falling back to store");
                metrics::counter!("user_cache_lookups_total", "result" => "error").increment(1);
                return None;
            }
        };

        match serde_json::from_str::<UserProjection>(&raw) {
            Ok(projection) => {
                debug!(%key, "Cache HIT");
                metrics::counter!("user_cache_lookups_total", "result" => "hit").increment(1);
                Some(projection)
            }
            Err(e) => {
                warn!(%key, error = %e, "Cached value is not a valid user projection");
                metrics::counter!("user_cache_lookups_total", "result" => "corrupt").increment(1);
                None
            }
        }
    }

    /// Writes (or overwrites) the entry for `projection.id`.
    pub async fn set(&self, projection: &UserProjection) {
        let key = Self::key(projection.id);

        let payload = match serde_json::to_string(projection) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(%key, error = %e, "Failed to serialize user projection");
                return;
            }
        };

        if let Err(e) = self.backend.set(&key, &payload, self.ttl_seconds).await {
            warn!(%key, error = %e, "Cache SET failed");
            metrics::counter!("user_cache_write_errors_total", "op" => "set").increment(1);
        }
    }

    /// Removes the entry for `id` so a deleted user is not served until TTL lapses.
    pub async fn invalidate(&self, id: Uuid) {
        let key = Self::key(id);

        if let Err(e) = self.backend.delete(&key).await {
            warn!(%key, error = %e, "Cache DEL failed");
            metrics::counter!("user_cache_write_errors_total", "op" => "delete").increment(1);
        }
    }

    pub async fn ping(&self) -> bool {
        self.backend.ping().await
    }

    /// Read-through lookup.
    ///
    /// Returns the cached projection when present. Otherwise runs `load`
    /// against the store and, on success, populates the cache before returning.
    /// Loader errors are returned untouched and nothing is cached.
    pub async fn read_through<F, Fut, E>(&self, id: Uuid, load: F) -> Result<UserProjection, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<UserProjection, E>>,
    {
        if let Some(cached) = self.get(id).await {
            return Ok(cached);
        }

        let loaded = load().await?;
        self.set(&loaded).await;
        Ok(loaded)
    }
}
