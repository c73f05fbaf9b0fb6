//! API route configuration.

use crate::api::handlers::{
    create_user_handler, delete_user_handler, get_user_handler, get_user_preferences_handler,
    list_users_handler, update_push_token_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

/// User account routes, mounted under the configured API prefix.
///
/// # Endpoints
///
/// - `POST   /create-user`              - Create a user with preferences
/// - `GET    /all`                      - Paginated list (never cached)
/// - `GET    /{id}`                     - Fetch a user (read-through cache)
/// - `GET    /{id}/preferences`         - Fetch a user's notification preferences
/// - `PUT    /{id}/update-push-token`   - Update push token (refreshes cache)
/// - `DELETE /{id}`                     - Delete a user (evicts cache)
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/create-user", post(create_user_handler))
        .route("/all", get(list_users_handler))
        .route("/{id}", get(get_user_handler).delete(delete_user_handler))
        .route("/{id}/preferences", get(get_user_preferences_handler))
        .route("/{id}/update-push-token", put(update_push_token_handler))
}
