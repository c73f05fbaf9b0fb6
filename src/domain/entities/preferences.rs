//! Notification preferences owned one-to-one by a user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted preferences row.
///
/// Created in the same transaction as its user and removed with it
/// (`ON DELETE CASCADE`); there is no standalone lifecycle.
#[derive(Debug, Clone)]
pub struct UserPreferences {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: bool,
    pub push: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserPreferences {
    pub fn flags(&self) -> PreferenceFlags {
        PreferenceFlags {
            email: self.email,
            push: self.push,
        }
    }
}

/// The two notification switches, as supplied on create and as cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceFlags {
    pub email: bool,
    pub push: bool,
}
