//! Authentication manager implementation.

use super::{
    errors::{AuthError, AuthResult, Rejection},
    hasher::CredentialHasher,
    models::{LoginRequest, SessionTokens, SignupRequest, TokenClaims, TokenScope, User},
    token::TokenCodec,
};
use crate::db::UserRepository;
use argon2::Params;
use chrono::Duration;
use log::{debug, info};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Maximum username length, matching the `users.username` column
pub const MAX_USERNAME_LEN: usize = 20;

/// Authentication settings
#[derive(Clone)]
pub struct AuthConfig {
    /// Secret key for JWT signing
    pub jwt_secret: String,
    /// Optional server-side pepper for password hashing
    pub password_pepper: Option<String>,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    /// Argon2 cost parameters for new password hashes
    pub password_hash_params: Params,
}

impl AuthConfig {
    /// Config with the default 15 minute / 7 day token lifetimes
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            password_pepper: None,
            access_token_ttl: Duration::minutes(15),
            refresh_token_ttl: Duration::days(7),
            password_hash_params: Params::default(),
        }
    }
}

/// Authentication manager
///
/// Holds no per-request state; share it behind an `Arc` across handlers.
#[derive(Clone)]
pub struct AuthManager {
    users: Arc<dyn UserRepository>,
    hasher: CredentialHasher,
    codec: TokenCodec,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `users` - User directory
    /// * `config` - Signing secret, pepper and token lifetimes
    pub fn new(users: Arc<dyn UserRepository>, config: AuthConfig) -> Self {
        Self {
            users,
            hasher: CredentialHasher::new(config.password_pepper, config.password_hash_params),
            codec: TokenCodec::new(config.jwt_secret.as_bytes()),
            access_token_ttl: config.access_token_ttl,
            refresh_token_ttl: config.refresh_token_ttl,
        }
    }

    /// The codec used to sign and verify this manager's tokens
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Register a new user
    ///
    /// The user starts logged out (no refresh token).
    ///
    /// # Errors
    ///
    /// * `AuthError::UsernameTaken` - Username already exists
    /// * `AuthError::InvalidInput` - Username or password rejected
    pub async fn signup(&self, request: SignupRequest) -> AuthResult<User> {
        validate_username(&request.username)?;
        if request.password.is_empty() {
            return Err(AuthError::InvalidInput("Password must not be empty".to_string()));
        }

        if self.users.find_by_username(&request.username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let password_hash = self.hasher.hash(&request.password)?;
        let user = self.users.create_user(&request.username, &password_hash).await?;

        info!("Registered user {} (id {})", user.username, user.id);
        Ok(user)
    }

    /// Login a user
    ///
    /// Mints an access/refresh pair and stores the refresh token, which marks
    /// the session active.
    ///
    /// # Errors
    ///
    /// * `AuthError::UserNotFound` - User doesn't exist
    /// * `AuthError::InvalidPassword` - Incorrect password
    pub async fn login(&self, request: LoginRequest) -> AuthResult<SessionTokens> {
        let user = self
            .users
            .find_by_username(&request.username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !self.hasher.verify(&request.password, &user.password_hash) {
            return Err(AuthError::InvalidPassword);
        }

        let tokens = self.issue_tokens(&user.username)?;
        self.users
            .update_refresh_token(&user.username, Some(&tokens.refresh_token))
            .await?
            .ok_or(AuthError::UserNotFound)?;

        debug!("Issued session tokens for {}", user.username);
        Ok(tokens)
    }

    /// Logout by clearing the stored refresh token
    ///
    /// Every outstanding token of this user stops authorizing immediately.
    pub async fn logout(&self, user: &User) -> AuthResult<User> {
        let user = self
            .users
            .update_refresh_token(&user.username, None)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        info!("User {} logged out", user.username);
        Ok(user)
    }

    /// Authorize a protected request from its bearer access token
    ///
    /// Runs decode, scope check, subject check, access-only check, user lookup
    /// and revocation check, in that order. Every failure is
    /// `AuthError::Unauthorized`.
    pub async fn authorize(&self, token: &str) -> AuthResult<User> {
        let (subject, scope) = self.validate(token).inspect_err(log_rejection)?;
        if scope != TokenScope::Access {
            log_rejection(&Rejection::WrongScope);
            return Err(Rejection::WrongScope.into());
        }

        let user = self.active_user(&subject).await?;
        Ok(user)
    }

    /// Exchange an active refresh token for a new token pair
    ///
    /// The presented token must be the one stored by the latest login or
    /// refresh; the stored token is rotated.
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<SessionTokens> {
        let (subject, scope) = self.validate(refresh_token).inspect_err(log_rejection)?;
        if scope != TokenScope::Refresh {
            log_rejection(&Rejection::WrongScope);
            return Err(Rejection::WrongScope.into());
        }

        let user = self.active_user(&subject).await?;
        let stored = user.refresh_token.as_deref().unwrap_or_default();
        if !bool::from(stored.as_bytes().ct_eq(refresh_token.as_bytes())) {
            log_rejection(&Rejection::RefreshTokenMismatch);
            return Err(Rejection::RefreshTokenMismatch.into());
        }

        let tokens = self.issue_tokens(&user.username)?;
        self.users
            .update_refresh_token(&user.username, Some(&tokens.refresh_token))
            .await?
            .ok_or(Rejection::UnknownUser)?;

        Ok(tokens)
    }

    /// Decode a token and check its scope and subject
    fn validate(&self, token: &str) -> Result<(String, TokenScope), Rejection> {
        let claims: TokenClaims = self.codec.decode(token)?;
        let scope = claims.token_scope().ok_or(Rejection::InvalidScope)?;
        let subject = claims.sub.ok_or(Rejection::MissingSubject)?;
        Ok((subject, scope))
    }

    /// Look up the subject and require an active session
    async fn active_user(&self, subject: &str) -> AuthResult<User> {
        let Some(user) = self.users.find_by_username(subject).await? else {
            log_rejection(&Rejection::UnknownUser);
            return Err(Rejection::UnknownUser.into());
        };

        if !user.has_active_session() {
            log_rejection(&Rejection::SessionRevoked);
            return Err(Rejection::SessionRevoked.into());
        }

        Ok(user)
    }

    fn issue_tokens(&self, username: &str) -> AuthResult<SessionTokens> {
        Ok(SessionTokens {
            access_token: self
                .codec
                .encode(username, TokenScope::Access, self.access_token_ttl)?,
            refresh_token: self
                .codec
                .encode(username, TokenScope::Refresh, self.refresh_token_ttl)?,
        })
    }
}

fn log_rejection(rejection: &Rejection) {
    debug!("Authorization rejected: {}", rejection);
}

/// Validate username format
fn validate_username(username: &str) -> AuthResult<()> {
    let len = username.chars().count();
    if len == 0 || len > MAX_USERNAME_LEN {
        return Err(AuthError::InvalidInput(format!(
            "Username must be 1-{} characters",
            MAX_USERNAME_LEN
        )));
    }

    if username.chars().any(char::is_whitespace) {
        return Err(AuthError::InvalidInput(
            "Username must not contain whitespace".to_string(),
        ));
    }

    Ok(())
}
