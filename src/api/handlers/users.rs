//! Handlers for user account endpoints.
//!
//! Each handler is a thin translation layer: extract, call
//! [`crate::application::services::UserService`], wrap the result in
//! [`ApiResponse`]. Errors propagate as [`AppError`].

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;

use crate::api::dto::pagination::{PaginationMeta, PaginationParams};
use crate::api::dto::response::ApiResponse;
use crate::api::dto::user::{
    CreateUserRequest, UpdatePushTokenRequest, UserListResponse, UserResponse,
};
use crate::api::extractors::{AppJson, AppQuery, ValidatedJson};
use crate::application::services::parse_user_id;
use crate::domain::entities::{PreferenceFlags, UserProjection};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a user and its preferences.
///
/// # Endpoint
///
/// `POST /create-user`
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Ada Lovelace",
///   "email": "ada@example.com",
///   "push_token": "fcm-token",            // optional
///   "preferences": { "email": true, "push": false },
///   "password": "at-least-8-chars"
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request on validation failure or duplicate email.
pub async fn create_user_handler(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), AppError> {
    let user = state.user_service.create_user(payload.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            UserResponse::from(user),
            "User created successfully.",
        )),
    ))
}

/// Fetches a user by id, from cache when possible.
///
/// # Endpoint
///
/// `GET /{id}`
///
/// # Response
///
/// The cached projection shape: `{id, name, email, push_token, preferences: {email, push}}`.
///
/// # Errors
///
/// Returns 404 Not Found if the user does not exist.
pub async fn get_user_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserProjection>>, AppError> {
    let id = parse_user_id(&id)?;
    let user = state.user_service.get_user(id).await?;

    Ok(Json(ApiResponse::ok(user, "User retrieved successfully.")))
}

/// Fetches the notification preferences of a user.
///
/// # Endpoint
///
/// `GET /{id}/preferences`
///
/// # Errors
///
/// Returns 404 Not Found if the user does not exist.
pub async fn get_user_preferences_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<PreferenceFlags>>, AppError> {
    let id = parse_user_id(&id)?;
    let preferences = state.user_service.get_preferences(id).await?;

    Ok(Json(ApiResponse::ok(
        preferences,
        "User preferences retrieved successfully.",
    )))
}

/// Lists users with pagination. Always read from the database.
///
/// # Endpoint
///
/// `GET /all?page=1&limit=10`
///
/// # Errors
///
/// Returns 400 Bad Request if `page` is 0 or `limit` is outside 1..=100.
pub async fn list_users_handler(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> Result<Json<ApiResponse<UserListResponse>>, AppError> {
    let (page, limit) = params
        .validate_and_get_page_limit()
        .map_err(|e| AppError::bad_request(e, json!({})))?;

    let (users, total) = state.user_service.list_users(page, limit).await?;

    let data = UserListResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
    };

    Ok(Json(
        ApiResponse::ok(data, "Users retrieved successfully.")
            .with_meta(PaginationMeta::new(total, page, limit)),
    ))
}

/// Updates the push token of a user.
///
/// # Endpoint
///
/// `PUT /{id}/update-push-token`
///
/// # Request Body
///
/// ```json
/// { "push_token": "new-token" }   // null or absent: leave unchanged
/// ```
///
/// # Errors
///
/// Returns 404 Not Found if the user does not exist.
pub async fn update_push_token_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdatePushTokenRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let id = parse_user_id(&id)?;
    let user = state
        .user_service
        .update_push_token(id, payload.push_token)
        .await?;

    Ok(Json(ApiResponse::ok(
        UserResponse::from(user),
        "Push token updated successfully.",
    )))
}

/// Deletes a user and evicts it from the cache.
///
/// # Endpoint
///
/// `DELETE /{id}`
///
/// # Errors
///
/// Returns 404 Not Found if the user does not exist.
pub async fn delete_user_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let id = parse_user_id(&id)?;
    state.user_service.delete_user(id).await?;

    Ok(Json(ApiResponse::message("User deleted successfully.")))
}
