//! Caching layer for user lookups.
//!
//! Two levels:
//! - [`CacheService`] - raw key/value transport with TTLs
//!   ([`RedisCache`], [`MemoryCache`], [`NullCache`])
//! - [`UserCache`] - typed projection cache that swallows transport errors and
//!   provides the read-through combinator used by the user service

mod memory_cache;
mod null_cache;
mod redis_cache;
mod service;
mod user_cache;

pub use memory_cache::MemoryCache;
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
#[cfg(test)]
pub use service::MockCacheService;
pub use service::{CacheError, CacheResult, CacheService};
pub use user_cache::{DEFAULT_USER_TTL_SECONDS, UserCache};
