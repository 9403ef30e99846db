//! User directory abstraction and its PostgreSQL implementation.
//!
//! The session manager only depends on [`UserRepository`], so tests can swap
//! in [`InMemoryUserRepository`](super::InMemoryUserRepository).

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::auth::{AuthError, AuthResult, User};

/// Trait for user directory operations
///
/// Every method is a single atomic write or read; a cancelled call never
/// leaves a half-applied change behind.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by username (case-sensitive)
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>>;

    /// Create a new user without a refresh token
    ///
    /// Returns `AuthError::UsernameTaken` if the username already exists.
    async fn create_user(&self, username: &str, password_hash: &str) -> AuthResult<User>;

    /// Set or clear the stored refresh token, returning the updated user
    async fn update_refresh_token(
        &self,
        username: &str,
        refresh_token: Option<&str>,
    ) -> AuthResult<Option<User>>;

    /// Check that the backing store is reachable
    async fn health_check(&self) -> AuthResult<()> {
        Ok(())
    }
}

/// PostgreSQL implementation of `UserRepository`
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        refresh_token: row.get("refresh_token"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, refresh_token, created_at
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> AuthResult<User> {
        // ON CONFLICT keeps two racing signups from both succeeding
        let row = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (username) DO NOTHING
            RETURNING id, username, password_hash, refresh_token, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref()
            .map(user_from_row)
            .ok_or(AuthError::UsernameTaken)
    }

    async fn update_refresh_token(
        &self,
        username: &str,
        refresh_token: Option<&str>,
    ) -> AuthResult<Option<User>> {
        let row = sqlx::query(
            r#"
            UPDATE users SET refresh_token = $2
            WHERE username = $1
            RETURNING id, username, password_hash, refresh_token, created_at
            "#,
        )
        .bind(username)
        .bind(refresh_token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn health_check(&self) -> AuthResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
