//! Repository trait for user account data access.

use crate::domain::entities::{NewUser, PreferenceFlags, User};
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

/// Store gateway for the `users` and `user_preferences` tables.
///
/// Every returned [`User`] carries its preferences row.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUserRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_user.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by email address.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Finds a user by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Inserts the user row and its preferences row in one transaction.
    ///
    /// Either both rows are committed or neither is.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the email is already taken, including
    /// when a concurrent insert wins the race past the caller's pre-check.
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_user: NewUser, preferences: PreferenceFlags)
    -> Result<User, AppError>;

    /// Replaces the push token and bumps `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no user has this id.
    /// Returns [`AppError::Internal`] on database errors.
    async fn update_push_token(&self, id: Uuid, push_token: &str) -> Result<User, AppError>;

    /// Returns one page of users ordered by creation time, plus the total count.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<User>, i64), AppError>;

    /// Deletes a user; its preferences go with it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no user has this id.
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;

    /// Round-trips a trivial query to check connectivity.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] when the database is unreachable.
    async fn ping(&self) -> Result<(), AppError>;
}
