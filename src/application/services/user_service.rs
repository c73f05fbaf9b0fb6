//! User account lifecycle and cache policy.

use std::sync::Arc;

use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::domain::entities::{CreateUser, NewUser, PreferenceFlags, User, UserProjection};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;
use crate::infrastructure::cache::UserCache;
use crate::utils::password::hash_password_blocking;

/// Orchestrates the store and the cache for every account operation.
///
/// # Cache policy
///
/// - `get_user` / `get_preferences`: read-through, cache first
/// - `create_user` / `update_push_token`: store write, then overwrite the entry
/// - `delete_user`: store delete, then remove the entry
/// - `list_users`: store only
///
/// Cache failures never fail an operation; see [`UserCache`].
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    cache: Arc<UserCache>,
}

impl<R: UserRepository> UserService<R> {
    /// Creates a new user service.
    pub fn new(repository: Arc<R>, cache: Arc<UserCache>) -> Self {
        Self { repository, cache }
    }

    /// Creates a user together with its preferences.
    ///
    /// The email pre-check gives a friendly error in the common case; the
    /// store's unique constraint is what actually enforces uniqueness, and the
    /// repository reports a lost race as [`AppError::Conflict`] too.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the email is already registered.
    /// Returns [`AppError::Internal`] on database or hashing errors.
    pub async fn create_user(&self, input: CreateUser) -> Result<User, AppError> {
        if self
            .repository
            .find_by_email(&input.email)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(
                "User with this email already exists.",
                json!({ "field": "email" }),
            ));
        }

        let password_hash = hash_password_blocking(input.password).await?;

        let new_user = NewUser {
            name: input.name,
            email: input.email,
            push_token: input.push_token,
            password_hash,
        };

        let user = self.repository.create(new_user, input.preferences).await?;
        self.cache.set(&user.projection()).await;

        info!(user_id = %user.id, "User created");
        Ok(user)
    }

    /// Returns the user projection, from cache when possible.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn get_user(&self, id: Uuid) -> Result<UserProjection, AppError> {
        let repository = &self.repository;

        self.cache
            .read_through(id, || async move {
                repository
                    .find_by_id(id)
                    .await?
                    .map(|user| user.projection())
                    .ok_or_else(|| user_not_found(id))
            })
            .await
    }

    /// Returns the notification preferences of a user.
    ///
    /// Served from the same cached projection as [`Self::get_user`].
    ///
    /// # Errors
    ///
    /// See [`Self::get_user`].
    pub async fn get_preferences(&self, id: Uuid) -> Result<PreferenceFlags, AppError> {
        Ok(self.get_user(id).await?.preferences)
    }

    /// Lists users page by page, straight from the store.
    ///
    /// `page` is 1-based; the caller guarantees `page >= 1` and `limit >= 1`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn list_users(&self, page: u32, limit: u32) -> Result<(Vec<User>, i64), AppError> {
        let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);
        self.repository.list(offset, i64::from(limit)).await
    }

    /// Sets a new push token, or leaves it unchanged when `push_token` is `None`.
    ///
    /// The cache entry is overwritten in both cases, after the store write.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn update_push_token(
        &self,
        id: Uuid,
        push_token: Option<String>,
    ) -> Result<User, AppError> {
        let user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| user_not_found(id))?;

        let user = match push_token {
            Some(token) => self.repository.update_push_token(id, &token).await?,
            None => user,
        };

        self.cache.set(&user.projection()).await;

        info!(user_id = %id, "Push token updated");
        Ok(user)
    }

    /// Deletes a user and evicts it from the cache.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn delete_user(&self, id: Uuid) -> Result<(), AppError> {
        self.repository.delete(id).await?;
        self.cache.invalidate(id).await;

        info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Returns true if the store answers a trivial query.
    pub async fn store_healthy(&self) -> bool {
        self.repository.ping().await.is_ok()
    }

    /// Returns true if the cache backend answers a ping.
    pub async fn cache_healthy(&self) -> bool {
        self.cache.ping().await
    }

    pub fn cache_backend(&self) -> &'static str {
        self.cache.backend()
    }
}

/// Parses an opaque user id from a path segment.
///
/// Ids that are not UUIDs cannot name an existing user, so they are reported
/// as not found rather than as malformed input.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] if `raw` is not a UUID.
pub fn parse_user_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| {
        AppError::not_found(format!("User {} not found.", raw), json!({ "id": raw }))
    })
}

fn user_not_found(id: Uuid) -> AppError {
    AppError::not_found(format!("User {} not found.", id), json!({ "id": id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::UserPreferences;
    use crate::domain::repositories::MockUserRepository;
    use crate::infrastructure::cache::{CacheService, MemoryCache};
    use chrono::Utc;

    fn test_user(id: Uuid, email: &str, push_token: Option<&str>) -> User {
        User {
            id,
            name: "Test User".to_string(),
            email: email.to_string(),
            push_token: push_token.map(str::to_string),
            password_hash: "$argon2id$v=19$hash".to_string(),
            preferences: UserPreferences {
                id: Uuid::new_v4(),
                user_id: id,
                email: true,
                push: false,
                created_at: Utc::now(),
                updated_at: None,
            },
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn create_input(email: &str) -> CreateUser {
        CreateUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            push_token: None,
            password: "longenough".to_string(),
            preferences: PreferenceFlags {
                email: true,
                push: false,
            },
        }
    }

    fn service(repo: MockUserRepository) -> (UserService<MockUserRepository>, Arc<MemoryCache>) {
        let backend = Arc::new(MemoryCache::new());
        let cache = Arc::new(UserCache::new(backend.clone(), 3600));
        (UserService::new(Arc::new(repo), cache), backend)
    }

    #[tokio::test]
    async fn test_create_user_success_populates_cache() {
        let mut repo = MockUserRepository::new();
        let id = Uuid::new_v4();

        repo.expect_find_by_email()
            .withf(|email| email == "new@example.com")
            .times(1)
            .returning(|_| Ok(None));

        let created = test_user(id, "new@example.com", None);
        repo.expect_create()
            .withf(|new_user, prefs| {
                new_user.password_hash.starts_with("$argon2id$")
                    && new_user.password_hash != "longenough"
                    && prefs.email
                    && !prefs.push
            })
            .times(1)
            .returning(move |_, _| Ok(created.clone()));

        let (service, backend) = service(repo);
        let user = service
            .create_user(create_input("new@example.com"))
            .await
            .unwrap();

        assert_eq!(user.id, id);
        assert!(backend.contains(&UserCache::key(id)));
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email_is_conflict() {
        let mut repo = MockUserRepository::new();
        let existing = test_user(Uuid::new_v4(), "taken@example.com", None);

        repo.expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_create().times(0);

        let (service, _) = service(repo);
        let result = service.create_user(create_input("taken@example.com")).await;

        assert!(matches!(result.unwrap_err(), AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_create_user_lost_race_stays_conflict() {
        let mut repo = MockUserRepository::new();

        repo.expect_find_by_email().returning(|_| Ok(None));
        repo.expect_create().times(1).returning(|_, _| {
            Err(AppError::conflict(
                "User with this email already exists.",
                json!({ "field": "email" }),
            ))
        });

        let (service, _) = service(repo);
        let result = service.create_user(create_input("race@example.com")).await;

        assert!(matches!(result.unwrap_err(), AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_get_user_after_create_is_served_from_cache() {
        let mut repo = MockUserRepository::new();
        let id = Uuid::new_v4();
        let created = test_user(id, "cached@example.com", Some("tok"));

        repo.expect_find_by_email().returning(|_| Ok(None));
        repo.expect_create()
            .returning(move |_, _| Ok(created.clone()));
        repo.expect_find_by_id().times(0);

        let (service, _) = service(repo);
        service
            .create_user(create_input("cached@example.com"))
            .await
            .unwrap();

        let projection = service.get_user(id).await.unwrap();
        assert_eq!(projection.email, "cached@example.com");
        assert_eq!(projection.push_token.as_deref(), Some("tok"));
        assert!(projection.preferences.email);
    }

    #[tokio::test]
    async fn test_get_user_miss_loads_once_then_hits() {
        let mut repo = MockUserRepository::new();
        let id = Uuid::new_v4();
        let stored = test_user(id, "miss@example.com", None);

        repo.expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));

        let (service, backend) = service(repo);

        let first = service.get_user(id).await.unwrap();
        assert!(backend.contains(&UserCache::key(id)));
        let second = service.get_user(id).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.email, "miss@example.com");
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().times(1).returning(|_| Ok(None));

        let (service, backend) = service(repo);
        let id = Uuid::new_v4();
        let result = service.get_user(id).await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
        assert!(!backend.contains(&UserCache::key(id)));
    }

    #[tokio::test]
    async fn test_get_preferences_uses_projection() {
        let mut repo = MockUserRepository::new();
        let id = Uuid::new_v4();
        let stored = test_user(id, "prefs@example.com", None);
        repo.expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));

        let (service, _) = service(repo);
        let prefs = service.get_preferences(id).await.unwrap();

        assert_eq!(
            prefs,
            PreferenceFlags {
                email: true,
                push: false
            }
        );
    }

    #[tokio::test]
    async fn test_update_push_token_none_is_noop() {
        let mut repo = MockUserRepository::new();
        let id = Uuid::new_v4();
        let stored = test_user(id, "noop@example.com", Some("old"));

        repo.expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));
        repo.expect_update_push_token().times(0);

        let (service, _) = service(repo);
        let user = service.update_push_token(id, None).await.unwrap();

        assert_eq!(user.push_token.as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn test_update_push_token_refreshes_cache() {
        let mut repo = MockUserRepository::new();
        let id = Uuid::new_v4();
        let before = test_user(id, "upd@example.com", Some("old"));
        let after = test_user(id, "upd@example.com", Some("abc"));

        repo.expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(before.clone())));
        repo.expect_update_push_token()
            .withf(|_, token| token == "abc")
            .times(1)
            .returning(move |_, _| Ok(after.clone()));

        let (service, backend) = service(repo);

        // Stale entry from an earlier read.
        let stale = test_user(id, "upd@example.com", Some("old")).projection();
        backend
            .set(
                &UserCache::key(id),
                &serde_json::to_string(&stale).unwrap(),
                3600,
            )
            .await
            .unwrap();

        service
            .update_push_token(id, Some("abc".to_string()))
            .await
            .unwrap();

        let projection = service.get_user(id).await.unwrap();
        assert_eq!(projection.push_token.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_update_push_token_unknown_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        repo.expect_update_push_token().times(0);

        let (service, _) = service(repo);
        let result = service
            .update_push_token(Uuid::new_v4(), Some("abc".to_string()))
            .await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_invalidates_cache_before_ttl() {
        let mut repo = MockUserRepository::new();
        let id = Uuid::new_v4();
        let stored = test_user(id, "gone@example.com", None);

        let mut seq = mockall::Sequence::new();
        repo.expect_find_by_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(Some(stored.clone())));
        repo.expect_delete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        repo.expect_find_by_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));

        let (service, backend) = service(repo);

        service.get_user(id).await.unwrap();
        assert!(backend.contains(&UserCache::key(id)));

        service.delete_user(id).await.unwrap();
        assert!(!backend.contains(&UserCache::key(id)));

        let result = service.get_user(id).await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_unknown_user_keeps_cache_untouched() {
        let mut repo = MockUserRepository::new();
        let id = Uuid::new_v4();
        repo.expect_delete()
            .times(1)
            .returning(move |id| Err(user_not_found(id)));

        let (service, backend) = service(repo);
        backend
            .set(&UserCache::key(id), "{}", 3600)
            .await
            .unwrap();

        let result = service.delete_user(id).await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
        assert!(backend.contains(&UserCache::key(id)));
    }

    #[tokio::test]
    async fn test_list_users_computes_offset_and_bypasses_cache() {
        let mut repo = MockUserRepository::new();
        repo.expect_list()
            .withf(|offset, limit| *offset == 8 && *limit == 4)
            .times(2)
            .returning(|_, _| Ok((Vec::new(), 10)));

        let (service, _) = service(repo);

        let (_, total) = service.list_users(3, 4).await.unwrap();
        assert_eq!(total, 10);
        // Second call must hit the store again.
        service.list_users(3, 4).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_users_first_page_offset_is_zero() {
        let mut repo = MockUserRepository::new();
        repo.expect_list()
            .withf(|offset, limit| *offset == 0 && *limit == 10)
            .times(1)
            .returning(|_, _| Ok((Vec::new(), 0)));

        let (service, _) = service(repo);
        service.list_users(1, 10).await.unwrap();
    }

    #[test]
    fn test_parse_user_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_user_id(&id.to_string()).unwrap(), id);
        assert!(matches!(
            parse_user_id("not-a-uuid").unwrap_err(),
            AppError::NotFound { .. }
        ));
    }
}
