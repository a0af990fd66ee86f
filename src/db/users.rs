//! User credential store: lookup by email, insert, last-login touch.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::debug;
use uuid::Uuid;

use super::DbPool;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    /// Salted password hash; never plaintext.
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Persistence operations the auth flow relies on. Implementations hold no business logic.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Exact-match lookup.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRow>>;

    /// Insert a new user and return its identifier.
    /// Fails with [`AppError::ConstraintViolation`] when the email is taken.
    async fn insert_user(
        &self,
        email: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> AppResult<Uuid>;

    /// Set `updated_at` for the row with this email.
    async fn touch_last_login(&self, email: &str, at: DateTime<Utc>) -> AppResult<()>;
}

/// Postgres SQLSTATE 23505.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: DbPool,
}

impl PgUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_user(
        &self,
        email: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> AppResult<Uuid> {
        let row: Result<(Uuid,), sqlx::Error> = sqlx::query_as(
            r#"
            INSERT INTO users (email, password, created_at)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await;

        match row {
            Ok((id,)) => Ok(id),
            Err(err) if is_unique_violation(&err) => {
                Err(AppError::ConstraintViolation(err.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn touch_last_login(&self, email: &str, at: DateTime<Utc>) -> AppResult<()> {
        let r = sqlx::query("UPDATE users SET updated_at = $1 WHERE email = $2")
            .bind(at)
            .bind(email)
            .execute(&self.pool)
            .await?;
        debug!(rows = r.rows_affected(), "last login updated");
        Ok(())
    }
}
