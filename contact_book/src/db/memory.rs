//! In-memory user directory.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::repository::UserRepository;
use crate::auth::{AuthError, AuthResult, User, UserId};

#[derive(Default)]
struct Inner {
    users: HashMap<String, User>,
    next_id: UserId,
}

/// `UserRepository` backed by a map, for tests and local runs without Postgres
#[derive(Default)]
pub struct InMemoryUserRepository {
    inner: RwLock<Inner>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.inner.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        Ok(self.inner.read().await.users.get(username).cloned())
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> AuthResult<User> {
        let mut inner = self.inner.write().await;
        if inner.users.contains_key(username) {
            return Err(AuthError::UsernameTaken);
        }

        inner.next_id += 1;
        let user = User {
            id: inner.next_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            refresh_token: None,
            created_at: Utc::now(),
        };
        inner.users.insert(username.to_string(), user.clone());

        Ok(user)
    }

    async fn update_refresh_token(
        &self,
        username: &str,
        refresh_token: Option<&str>,
    ) -> AuthResult<Option<User>> {
        let mut inner = self.inner.write().await;
        Ok(inner.users.get_mut(username).map(|user| {
            user.refresh_token = refresh_token.map(str::to_string);
            user.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create_user("alice", "hash").await.unwrap();

        assert_eq!(user.id, 1);
        assert!(user.refresh_token.is_none());

        let found = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found, user);
        assert!(repo.find_by_username("Alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.create_user("alice", "first").await.unwrap();

        let err = repo.create_user("alice", "second").await.unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));

        let stored = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "first");
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_refresh_token() {
        let repo = InMemoryUserRepository::new();
        repo.create_user("alice", "hash").await.unwrap();

        let updated = repo
            .update_refresh_token("alice", Some("token"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.refresh_token.as_deref(), Some("token"));

        let cleared = repo.update_refresh_token("alice", None).await.unwrap().unwrap();
        assert!(cleared.refresh_token.is_none());

        assert!(repo.update_refresh_token("bob", None).await.unwrap().is_none());
    }
}
