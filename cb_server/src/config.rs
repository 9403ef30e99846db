//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use chrono::Duration;
use contact_book::{auth::AuthConfig, db::DatabaseConfig};
use std::net::SocketAddr;

/// Default server bind address
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Default database URL
pub const DEFAULT_DATABASE_URL: &str = "postgres://postgres@localhost/contacts";

/// Longest accepted access token lifetime (one day)
pub const MAX_ACCESS_TOKEN_TTL_MINUTES: i64 = 24 * 60;

/// Longest accepted refresh token lifetime (one year)
pub const MAX_REFRESH_TOKEN_TTL_DAYS: i64 = 365;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Prometheus exporter address, disabled when `None`
    pub metrics_bind: Option<SocketAddr>,
}

/// Security-related configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// JWT signing secret (required)
    pub jwt_secret: String,
    /// Password hashing pepper (optional)
    pub password_pepper: Option<String>,
    /// Access token lifetime in minutes
    pub access_token_ttl_minutes: i64,
    /// Refresh token lifetime in days
    pub refresh_token_ttl_days: i64,
}

impl SecurityConfig {
    /// Settings for the session manager
    ///
    /// # Errors
    ///
    /// Returns error if a token lifetime is out of range
    pub fn auth_config(&self) -> Result<AuthConfig, ConfigError> {
        let (access_token_ttl, refresh_token_ttl) = self.token_lifetimes()?;

        Ok(AuthConfig {
            password_pepper: self.password_pepper.clone(),
            access_token_ttl,
            refresh_token_ttl,
            ..AuthConfig::new(self.jwt_secret.clone())
        })
    }

    /// Access and refresh lifetimes, each checked against its bounds
    fn token_lifetimes(&self) -> Result<(Duration, Duration), ConfigError> {
        let access = ttl_in_range(
            "ACCESS_TOKEN_TTL_MINUTES",
            self.access_token_ttl_minutes,
            MAX_ACCESS_TOKEN_TTL_MINUTES,
            Duration::try_minutes,
        )?;
        let refresh = ttl_in_range(
            "REFRESH_TOKEN_TTL_DAYS",
            self.refresh_token_ttl_days,
            MAX_REFRESH_TOKEN_TTL_DAYS,
            Duration::try_days,
        )?;

        Ok((access, refresh))
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        Self::from_lookup(
            |key| std::env::var(key).ok(),
            bind_override,
            database_url_override,
        )
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(
        lookup: F,
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Bind address
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_addr(&lookup, "SERVER_BIND")?
                .map_or_else(|| DEFAULT_BIND.parse(), Ok)
                .map_err(|_| ConfigError::Invalid {
                    var: "SERVER_BIND".to_string(),
                    reason: "Not a socket address".to_string(),
                })?,
        };

        let metrics_bind = parse_addr(&lookup, "METRICS_BIND")?;

        // Database configuration
        let database_url = database_url_override
            .or_else(|| lookup("DATABASE_URL"))
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let defaults = DatabaseConfig::development();
        let database = DatabaseConfig {
            database_url,
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", defaults.max_connections)?,
            min_connections: parse_or(&lookup, "DB_MIN_CONNECTIONS", defaults.min_connections)?,
            connection_timeout_secs: parse_or(
                &lookup,
                "DB_CONNECTION_TIMEOUT_SECS",
                defaults.connection_timeout_secs,
            )?,
            idle_timeout_secs: parse_or(&lookup, "DB_IDLE_TIMEOUT_SECS", defaults.idle_timeout_secs)?,
            max_lifetime_secs: parse_or(&lookup, "DB_MAX_LIFETIME_SECS", defaults.max_lifetime_secs)?,
        };

        // Security configuration (REQUIRED)
        let jwt_secret = lookup("JWT_SECRET").ok_or_else(|| ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Generate with: openssl rand -hex 32".to_string(),
        })?;

        if jwt_secret.len() < 32 {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET".to_string(),
                reason: "Must be at least 32 characters (128-bit security)".to_string(),
            });
        }

        let password_pepper = lookup("PASSWORD_PEPPER").filter(|p| !p.is_empty());
        if password_pepper.as_ref().is_some_and(|p| p.len() < 16) {
            return Err(ConfigError::Invalid {
                var: "PASSWORD_PEPPER".to_string(),
                reason: "Must be at least 16 characters (64-bit security)".to_string(),
            });
        }

        let security = SecurityConfig {
            jwt_secret,
            password_pepper,
            access_token_ttl_minutes: parse_or(&lookup, "ACCESS_TOKEN_TTL_MINUTES", 15)?,
            refresh_token_ttl_days: parse_or(&lookup, "REFRESH_TOKEN_TTL_DAYS", 7)?,
        };

        Ok(ServerConfig {
            bind,
            database,
            security,
            metrics_bind,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (access_ttl, refresh_ttl) = self.security.token_lifetimes()?;
        if access_ttl >= refresh_ttl {
            return Err(ConfigError::Invalid {
                var: "ACCESS_TOKEN_TTL_MINUTES".to_string(),
                reason: format!(
                    "Must be shorter than the refresh token lifetime ({} days)",
                    self.security.refresh_token_ttl_days
                ),
            });
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid {
                var: "DB_MIN_CONNECTIONS".to_string(),
                reason: format!(
                    "Cannot exceed DB_MAX_CONNECTIONS ({})",
                    self.database.max_connections
                ),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse a variable, falling back to `default` only when it is unset
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("'{}' is not a valid number", v),
        }),
        None => Ok(default),
    }
}

/// Convert a lifetime in `1..=max` units into a `Duration`
fn ttl_in_range(
    var: &str,
    value: i64,
    max: i64,
    to_duration: fn(i64) -> Option<Duration>,
) -> Result<Duration, ConfigError> {
    if !(1..=max).contains(&value) {
        return Err(ConfigError::Invalid {
            var: var.to_string(),
            reason: format!("Must be between 1 and {}", max),
        });
    }

    to_duration(value).ok_or_else(|| ConfigError::Invalid {
        var: var.to_string(),
        reason: "Out of range".to_string(),
    })
}

/// Parse an optional socket address; a present but unparsable value is an error
fn parse_addr<F>(lookup: &F, key: &str) -> Result<Option<SocketAddr>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| {
            v.parse().map_err(|_| ConfigError::Invalid {
                var: key.to_string(),
                reason: format!("'{}' is not a socket address", v),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned(), None, None)
    }

    fn secret() -> String {
        "a".repeat(32)
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Use openssl".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("JWT_SECRET"));
        assert!(msg.contains("Use openssl"));
    }

    #[test]
    fn test_missing_jwt_secret() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { ref var, .. } if var == "JWT_SECRET"));
    }

    #[test]
    fn test_short_jwt_secret() {
        let err = load(&[("JWT_SECRET", "short")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_defaults() {
        let secret = secret();
        let config = load(&[("JWT_SECRET", &secret)]).unwrap();

        assert_eq!(config.bind, DEFAULT_BIND.parse().unwrap());
        assert_eq!(config.database.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.security.access_token_ttl_minutes, 15);
        assert_eq!(config.security.refresh_token_ttl_days, 7);
        assert!(config.security.password_pepper.is_none());
        assert!(config.metrics_bind.is_none());
        config.validate().unwrap();

        let auth = config.security.auth_config().unwrap();
        assert_eq!(auth.access_token_ttl, Duration::minutes(15));
        assert_eq!(auth.refresh_token_ttl, Duration::days(7));
    }

    #[test]
    fn test_overrides_win_over_environment() {
        let secret = secret();
        let vars: HashMap<&str, String> = [
            ("JWT_SECRET", secret),
            ("SERVER_BIND", "0.0.0.0:9000".to_string()),
            ("DATABASE_URL", "postgres://env/db".to_string()),
        ]
        .into_iter()
        .collect();

        let config = ServerConfig::from_lookup(
            |key| vars.get(key).cloned(),
            Some("127.0.0.1:1234".parse().unwrap()),
            Some("postgres://cli/db".to_string()),
        )
        .unwrap();

        assert_eq!(config.bind.port(), 1234);
        assert_eq!(config.database.database_url, "postgres://cli/db");
    }

    #[test]
    fn test_invalid_bind_address() {
        let secret = secret();
        let err = load(&[("JWT_SECRET", &secret), ("METRICS_BIND", "nope")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "METRICS_BIND"));
    }

    #[test]
    fn test_short_pepper() {
        let secret = secret();
        let err = load(&[("JWT_SECRET", &secret), ("PASSWORD_PEPPER", "tiny")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "PASSWORD_PEPPER"));
    }

    #[test]
    fn test_access_ttl_must_be_shorter_than_refresh() {
        let secret = secret();
        let config = load(&[
            ("JWT_SECRET", &secret),
            ("ACCESS_TOKEN_TTL_MINUTES", "1440"),
            ("REFRESH_TOKEN_TTL_DAYS", "1"),
        ])
        .unwrap();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_zero_ttl_is_invalid() {
        let secret = secret();
        let config = load(&[("JWT_SECRET", &secret), ("REFRESH_TOKEN_TTL_DAYS", "0")]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_refresh_ttl_fails_validation() {
        let secret = secret();
        let config = load(&[
            ("JWT_SECRET", &secret),
            ("REFRESH_TOKEN_TTL_DAYS", "100000000"),
        ])
        .unwrap();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "REFRESH_TOKEN_TTL_DAYS"));
        assert!(config.security.auth_config().is_err());
    }

    #[test]
    fn test_extreme_access_ttl_is_an_error() {
        let secret = secret();
        let max = i64::MAX.to_string();
        let config = load(&[("JWT_SECRET", &secret), ("ACCESS_TOKEN_TTL_MINUTES", &max)]).unwrap();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "ACCESS_TOKEN_TTL_MINUTES"));
    }

    #[test]
    fn test_longest_accepted_lifetimes() {
        let secret = secret();
        let access = MAX_ACCESS_TOKEN_TTL_MINUTES.to_string();
        let refresh = MAX_REFRESH_TOKEN_TTL_DAYS.to_string();
        let config = load(&[
            ("JWT_SECRET", &secret),
            ("ACCESS_TOKEN_TTL_MINUTES", &access),
            ("REFRESH_TOKEN_TTL_DAYS", &refresh),
        ])
        .unwrap();

        config.validate().unwrap();
        let auth = config.security.auth_config().unwrap();
        assert_eq!(auth.refresh_token_ttl, Duration::days(MAX_REFRESH_TOKEN_TTL_DAYS));
    }

    #[test]
    fn test_unparsable_numbers_are_rejected() {
        let secret = secret();

        let err = load(&[("JWT_SECRET", &secret), ("ACCESS_TOKEN_TTL_MINUTES", "fifteen")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "ACCESS_TOKEN_TTL_MINUTES"));

        let err = load(&[("JWT_SECRET", &secret), ("DB_MAX_CONNECTIONS", "x")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "DB_MAX_CONNECTIONS"));
    }
}
