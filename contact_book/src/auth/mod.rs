//! Authentication core: password hashing, signed tokens, and sessions.
//!
//! This module implements:
//! - Argon2id password hashing with an optional server-side pepper
//! - HS256 JWT access tokens (15-minute expiry) and refresh tokens (7-day expiry)
//! - Server-side storage of the active refresh token, so logout revokes every
//!   outstanding token of the user
//!
//! ## Example
//!
//! ```no_run
//! use contact_book::auth::{AuthConfig, AuthManager, LoginRequest, SignupRequest};
//! use contact_book::db::InMemoryUserRepository;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let auth = AuthManager::new(
//!         Arc::new(InMemoryUserRepository::new()),
//!         AuthConfig::new("jwt_secret_at_least_32_characters_long"),
//!     );
//!
//!     auth.signup(SignupRequest {
//!         username: "alice".to_string(),
//!         password: "pw".to_string(),
//!     })
//!     .await?;
//!
//!     let tokens = auth
//!         .login(LoginRequest {
//!             username: "alice".to_string(),
//!             password: "pw".to_string(),
//!         })
//!         .await?;
//!
//!     let user = auth.authorize(&tokens.access_token).await?;
//!     println!("Authorized {}", user.username);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod hasher;
pub mod manager;
pub mod models;
pub mod token;

/// Argon2 cost parameters, see [`AuthConfig::password_hash_params`]
pub use argon2::Params as PasswordHashParams;
pub use errors::{AuthError, AuthResult, Rejection, TokenError};
pub use hasher::CredentialHasher;
pub use manager::{AuthConfig, AuthManager, MAX_USERNAME_LEN};
pub use models::{
    LoginRequest, SessionTokens, SignupRequest, TokenClaims, TokenScope, User, UserId,
};
pub use token::TokenCodec;
