//! Authentication data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User ID type
pub type UserId = i64;

/// User model
///
/// `refresh_token` is the revocation signal: when it is `None` the user is
/// logged out and no token for this user authorizes anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether the user currently holds an active session
    pub fn has_active_session(&self) -> bool {
        self.refresh_token.is_some()
    }
}

/// User signup request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

/// User login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Session tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Token scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenScope {
    #[serde(rename = "access_token")]
    Access,
    #[serde(rename = "refresh_token")]
    Refresh,
}

impl TokenScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenScope::Access => "access_token",
            TokenScope::Refresh => "refresh_token",
        }
    }
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenScope {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access_token" => Ok(TokenScope::Access),
            "refresh_token" => Ok(TokenScope::Refresh),
            _ => Err(()),
        }
    }
}

/// JWT claims shared by access and refresh tokens
///
/// `sub` and `scope` stay optional here so that a token missing either one
/// still decodes and is rejected by the authorization pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub iat: i64,              // Issued at timestamp
    pub exp: i64,              // Expiration timestamp
    #[serde(default)]
    pub jti: String,
}

impl TokenClaims {
    /// Parsed scope, `None` when absent or unrecognized
    pub fn token_scope(&self) -> Option<TokenScope> {
        self.scope.as_deref().and_then(|s| s.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_wire_names() {
        assert_eq!(
            serde_json::to_string(&TokenScope::Access).unwrap(),
            "\"access_token\""
        );
        assert_eq!("refresh_token".parse::<TokenScope>(), Ok(TokenScope::Refresh));
        assert!("admin".parse::<TokenScope>().is_err());
    }

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let user = User {
            id: 1,
            username: "alice".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            refresh_token: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "alice");
        assert!(json["refresh_token"].is_null());
    }

    #[test]
    fn test_claims_without_scope_or_subject_deserialize() {
        let claims: TokenClaims = serde_json::from_str(r#"{"iat": 1, "exp": 2}"#).unwrap();
        assert!(claims.sub.is_none());
        assert!(claims.token_scope().is_none());
    }
}
