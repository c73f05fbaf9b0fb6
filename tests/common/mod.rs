#![allow(dead_code)]

use serde_json::{Value, json};
use sqlx::PgPool;
use std::sync::Arc;
use user_directory::application::services::UserService;
use user_directory::infrastructure::cache::{CacheService, MemoryCache, UserCache};
use user_directory::infrastructure::persistence::PgUserRepository;
use user_directory::state::AppState;

pub const TEST_TTL_SECONDS: u64 = 60;

/// Builds state over the test database with an in-process cache.
///
/// The cache is returned so tests can look inside it.
pub fn create_test_state(pool: PgPool) -> (AppState, Arc<MemoryCache>) {
    let memory = Arc::new(MemoryCache::new());
    let state = create_state_with_cache(pool, memory.clone());
    (state, memory)
}

pub fn create_state_with_cache(pool: PgPool, backend: Arc<dyn CacheService>) -> AppState {
    let repository = Arc::new(PgUserRepository::new(Arc::new(pool)));
    let cache = Arc::new(UserCache::new(backend, TEST_TTL_SECONDS));
    AppState::new(Arc::new(UserService::new(repository, cache)))
}

pub fn user_body(name: &str, email: &str) -> Value {
    json!({
        "name": name,
        "email": email,
        "push_token": "initial-token",
        "preferences": { "email": true, "push": false },
        "password": "correct horse battery"
    })
}

pub async fn count_users(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn count_preferences(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM user_preferences")
        .fetch_one(pool)
        .await
        .unwrap()
}
