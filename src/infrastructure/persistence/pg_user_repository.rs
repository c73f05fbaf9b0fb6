//! PostgreSQL implementation of user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{PgConnection, PgExecutor, PgPool};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{NewUser, PreferenceFlags, User, UserPreferences};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;

/// Users joined with their preferences. Shared by every read.
const SELECT_USER: &str = r#"
    SELECT
        u.id, u.name, u.email, u.push_token, u.password,
        u.created_at, u.updated_at,
        p.id AS pref_id, p.email AS pref_email, p.push AS pref_push,
        p.created_at AS pref_created_at, p.updated_at AS pref_updated_at
    FROM users u
    JOIN user_preferences p ON p.user_id = u.id
"#;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    push_token: Option<String>,
    password: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    pref_id: Uuid,
    pref_email: bool,
    pref_push: bool,
    pref_created_at: DateTime<Utc>,
    pref_updated_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id,
            name: r.name,
            email: r.email,
            push_token: r.push_token,
            password_hash: r.password,
            preferences: UserPreferences {
                id: r.pref_id,
                user_id: r.id,
                email: r.pref_email,
                push: r.pref_push,
                created_at: r.pref_created_at,
                updated_at: r.pref_updated_at,
            },
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// PostgreSQL repository for users and their preferences.
///
/// Uses SQLx prepared statements for SQL injection protection. Account and
/// preferences rows are written in one transaction so a user is never visible
/// without preferences.
pub struct PgUserRepository {
    pool: Arc<PgPool>,
}

impl PgUserRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

async fn fetch_by_id<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<User>, sqlx::Error> {
    let sql = format!("{SELECT_USER} WHERE u.id = $1");
    let row = sqlx::query_as::<_, UserRow>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(row.map(User::from))
}

async fn insert_user(
    conn: &mut PgConnection,
    id: Uuid,
    new_user: &NewUser,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, push_token, password)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(id)
    .bind(&new_user.name)
    .bind(&new_user.email)
    .bind(&new_user.push_token)
    .bind(&new_user.password_hash)
    .execute(conn)
    .await?;

    Ok(())
}

async fn insert_preferences(
    conn: &mut PgConnection,
    user_id: Uuid,
    preferences: PreferenceFlags,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO user_preferences (id, user_id, email, push)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(preferences.email)
    .bind(preferences.push)
    .execute(conn)
    .await?;

    Ok(())
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("{SELECT_USER} WHERE u.email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(User::from))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(fetch_by_id(self.pool.as_ref(), id).await?)
    }

    async fn create(
        &self,
        new_user: NewUser,
        preferences: PreferenceFlags,
    ) -> Result<User, AppError> {
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        // A unique violation here rolls the transaction back on drop.
        insert_user(&mut tx, id, &new_user).await?;
        insert_preferences(&mut tx, id, preferences).await?;

        let user = fetch_by_id(&mut *tx, id).await?.ok_or_else(|| {
            AppError::internal("Created user could not be read back", json!({ "id": id }))
        })?;

        tx.commit().await?;
        Ok(user)
    }

    async fn update_push_token(&self, id: Uuid, push_token: &str) -> Result<User, AppError> {
        let result =
            sqlx::query("UPDATE users SET push_token = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(push_token)
                .execute(self.pool.as_ref())
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(
                format!("User {} not found.", id),
                json!({ "id": id }),
            ));
        }

        fetch_by_id(self.pool.as_ref(), id).await?.ok_or_else(|| {
            AppError::not_found(format!("User {} not found.", id), json!({ "id": id }))
        })
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<User>, i64), AppError> {
        let sql = format!("{SELECT_USER} ORDER BY u.created_at, u.id LIMIT $1 OFFSET $2");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok((rows.into_iter().map(User::from).collect(), total))
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(
                format!("User {} not found.", id),
                json!({ "id": id }),
            ));
        }

        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
