//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::application::services::UserService;
use crate::infrastructure::persistence::PgUserRepository;

/// State cloned into every request.
///
/// Holds no mutable data of its own: the service wraps the connection pool and
/// the cache client, both of which are safe to share across tasks.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService<PgUserRepository>>,
}

impl AppState {
    pub fn new(user_service: Arc<UserService<PgUserRepository>>) -> Self {
        Self { user_service }
    }
}
