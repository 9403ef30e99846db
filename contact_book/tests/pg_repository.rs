//! Integration tests for the PostgreSQL user directory.
//!
//! Require a running database; run with `cargo test -- --ignored` and
//! `DATABASE_URL` set.

use contact_book::auth::AuthError;
use contact_book::db::{Database, DatabaseConfig, UserRepository};

/// Helper to create a migrated test database
async fn setup_test_db() -> Database {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://postgres@localhost/contacts_test".to_string());

    let config = DatabaseConfig {
        database_url,
        max_connections: 5,
        min_connections: 1,
        ..DatabaseConfig::development()
    };

    let db = Database::new(&config)
        .await
        .expect("Failed to create test database");
    db.migrate().await.expect("Failed to run migrations");
    db
}

/// Generate a unique username that fits the 20 character column
fn unique_username(prefix: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}", prefix, &suffix[..8])
}

async fn cleanup_user(db: &Database, username: &str) {
    let _ = sqlx::query("DELETE FROM users WHERE username = $1")
        .bind(username)
        .execute(db.pool())
        .await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_create_and_find_user() {
    let db = setup_test_db().await;
    let users = db.users();
    let username = unique_username("pg_find");

    let created = users.create_user(&username, "hash").await.unwrap();
    assert!(created.id > 0);
    assert!(created.refresh_token.is_none());

    let found = users.find_by_username(&username).await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.password_hash, "hash");

    cleanup_user(&db, &username).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_username_conflicts() {
    let db = setup_test_db().await;
    let users = db.users();
    let username = unique_username("pg_dup");

    users.create_user(&username, "first").await.unwrap();
    let err = users.create_user(&username, "second").await.unwrap_err();
    assert!(matches!(err, AuthError::UsernameTaken));

    let stored = users.find_by_username(&username).await.unwrap().unwrap();
    assert_eq!(stored.password_hash, "first");

    cleanup_user(&db, &username).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_refresh_token_set_and_clear() {
    let db = setup_test_db().await;
    let users = db.users();
    let username = unique_username("pg_tok");

    users.create_user(&username, "hash").await.unwrap();

    let set = users
        .update_refresh_token(&username, Some("token"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(set.refresh_token.as_deref(), Some("token"));

    let cleared = users.update_refresh_token(&username, None).await.unwrap().unwrap();
    assert!(cleared.refresh_token.is_none());

    users.health_check().await.unwrap();
    cleanup_user(&db, &username).await;
}
