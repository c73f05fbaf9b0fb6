//! DTOs for user endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::entities::{CreateUser, PreferenceFlags, User, UserPreferences};

/// Request body for `POST /create-user`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 255, message = "Name must not be empty"))]
    pub name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    pub push_token: Option<String>,

    pub preferences: PreferenceFlags,

    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
}

impl From<CreateUserRequest> for CreateUser {
    fn from(req: CreateUserRequest) -> Self {
        CreateUser {
            name: req.name,
            email: req.email,
            push_token: req.push_token,
            password: req.password,
            preferences: req.preferences,
        }
    }
}

/// Request body for `PUT /{id}/update-push-token`.
///
/// A missing or `null` `push_token` leaves the stored token unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePushTokenRequest {
    #[serde(default)]
    pub push_token: Option<String>,
}

/// Preferences as returned to clients.
#[derive(Debug, Serialize)]
pub struct PreferencesResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: bool,
    pub push: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<UserPreferences> for PreferencesResponse {
    fn from(p: UserPreferences) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            email: p.email,
            push: p.push,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Full user view returned by create, update and list. Never includes the password.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub push_token: Option<String>,
    pub preferences: PreferencesResponse,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            push_token: u.push_token,
            preferences: u.preferences.into(),
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Payload of `GET /all`.
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
}
