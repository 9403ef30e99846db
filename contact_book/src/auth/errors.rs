//! Authentication error types.

use thiserror::Error;

/// Reasons a token fails to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Signature does not match the token contents
    #[error("bad signature")]
    BadSignature,

    /// Token is not a structurally valid JWT for this codec
    #[error("malformed token")]
    Malformed,

    /// Token expiry has passed
    #[error("token expired")]
    Expired,
}

/// Internal reason an authorization attempt was rejected.
///
/// Only used for diagnostics; every variant surfaces to clients as the same
/// unauthorized response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("no bearer token presented")]
    MissingCredentials,

    #[error("token rejected: {0}")]
    Token(#[from] TokenError),

    #[error("unrecognized token scope")]
    InvalidScope,

    #[error("token has no subject")]
    MissingSubject,

    #[error("token scope not accepted here")]
    WrongScope,

    #[error("token subject does not exist")]
    UnknownUser,

    #[error("session revoked")]
    SessionRevoked,

    #[error("refresh token is not the active one")]
    RefreshTokenMismatch,
}

impl Rejection {
    /// Short label used for metrics and structured logs
    pub fn label(&self) -> &'static str {
        match self {
            Rejection::MissingCredentials => "missing_credentials",
            Rejection::Token(TokenError::BadSignature) => "bad_signature",
            Rejection::Token(TokenError::Malformed) => "malformed",
            Rejection::Token(TokenError::Expired) => "expired",
            Rejection::InvalidScope => "invalid_scope",
            Rejection::MissingSubject => "missing_subject",
            Rejection::WrongScope => "wrong_scope",
            Rejection::UnknownUser => "unknown_user",
            Rejection::SessionRevoked => "session_revoked",
            Rejection::RefreshTokenMismatch => "refresh_token_mismatch",
        }
    }
}

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Password verification failed
    #[error("Invalid password")]
    InvalidPassword,

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Username already exists
    #[error("Username already exists")]
    UsernameTaken,

    /// Signup input rejected
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Token lifetime reaches past the representable time range
    #[error("Token lifetime out of range")]
    TokenLifetimeOutOfRange,

    /// JWT encoding error
    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    /// Token or session rejected
    #[error("Could not validate credentials")]
    Unauthorized(Rejection),
}

impl From<Rejection> for AuthError {
    fn from(rejection: Rejection) -> Self {
        AuthError::Unauthorized(rejection)
    }
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Database and JWT errors are sanitized to prevent information disclosure
    /// about the internal system structure. Rejections never say which check
    /// failed.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Database(_) => "Internal server error".to_string(),
            AuthError::JwtError(_) => "Authentication failed".to_string(),
            AuthError::HashingFailed | AuthError::TokenLifetimeOutOfRange => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections_share_client_message() {
        let expired = AuthError::from(Rejection::Token(TokenError::Expired));
        let revoked = AuthError::from(Rejection::SessionRevoked);
        let scope = AuthError::from(Rejection::WrongScope);

        assert_eq!(expired.client_message(), revoked.client_message());
        assert_eq!(revoked.client_message(), scope.client_message());
        assert!(!expired.client_message().contains("expired"));
    }

    #[test]
    fn test_database_error_is_sanitized() {
        let err = AuthError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn test_rejection_labels() {
        assert_eq!(Rejection::from(TokenError::BadSignature).label(), "bad_signature");
        assert_eq!(Rejection::SessionRevoked.label(), "session_revoked");
    }
}
