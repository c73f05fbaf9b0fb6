//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`   - Health check: database and cache (public)
//! - `{prefix}/*`     - User API, prefix from `API_PREFIX` (default `/api/v1/users`)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `api_prefix` - path the user routes are nested under, e.g. `/api/v1/users`
pub fn app_router(state: AppState, api_prefix: &str) -> NormalizePath<Router> {
    let router = Router::new()
        .route("/health", get(health_handler))
        .nest(api_prefix, api::routes::user_routes())
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
