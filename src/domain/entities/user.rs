//! User entity and its cacheable projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::preferences::{PreferenceFlags, UserPreferences};

/// A persisted user account with its preferences attached.
///
/// `password_hash` never leaves the service boundary: responses and cache
/// entries are built from [`UserProjection`] or the API DTOs, both of which
/// omit it.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub push_token: Option<String>,
    pub password_hash: String,
    pub preferences: UserPreferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Builds the denormalized view stored in the cache.
    pub fn projection(&self) -> UserProjection {
        UserProjection {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            push_token: self.push_token.clone(),
            preferences: self.preferences.flags(),
        }
    }
}

/// Row data for inserting a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub push_token: Option<String>,
    pub password_hash: String,
}

/// Input accepted by [`crate::application::services::UserService::create_user`].
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub push_token: Option<String>,
    pub password: String,
    pub preferences: PreferenceFlags,
}

/// Cache projection of a user: `{id, name, email, push_token, preferences: {email, push}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProjection {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub push_token: Option<String>,
    pub preferences: PreferenceFlags,
}
