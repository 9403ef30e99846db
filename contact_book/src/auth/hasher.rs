//! Argon2id password hashing with an optional server-side pepper.

use super::errors::{AuthError, AuthResult};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// One-way credential hasher
#[derive(Clone)]
pub struct CredentialHasher {
    pepper: Option<String>,
    params: Params,
}

impl CredentialHasher {
    /// Create a hasher
    ///
    /// # Arguments
    ///
    /// * `pepper` - Optional server-side pepper mixed into every secret
    /// * `params` - Argon2 cost parameters used for new hashes
    pub fn new(pepper: Option<String>, params: Params) -> Self {
        Self { pepper, params }
    }

    fn argon2(&self) -> Argon2<'_> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    fn peppered(&self, plain: &str) -> String {
        match &self.pepper {
            Some(pepper) => format!("{}{}", plain, pepper),
            None => plain.to_string(),
        }
    }

    /// Hash a secret with a fresh random salt
    pub fn hash(&self, plain: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        Ok(self
            .argon2()
            .hash_password(self.peppered(plain).as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    /// Check a secret against a stored hash
    ///
    /// A malformed hash never verifies. Cost parameters are read from the
    /// hash itself, so hashes made under older parameters keep working.
    pub fn verify(&self, plain: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };

        self.argon2()
            .verify_password(self.peppered(plain).as_bytes(), &parsed)
            .is_ok()
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new(None, Params::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher(pepper: Option<&str>) -> CredentialHasher {
        CredentialHasher::new(
            pepper.map(str::to_string),
            Params::new(1024, 1, 1, None).unwrap(),
        )
    }

    #[test]
    fn test_hash_then_verify() {
        let hasher = fast_hasher(None);
        let hash = hasher.hash("hunter2").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("hunter2", &hash));
        assert!(!hasher.verify("hunter3", &hash));
    }

    #[test]
    fn test_salt_differs_between_calls() {
        let hasher = fast_hasher(None);
        let first = hasher.hash("pw").unwrap();
        let second = hasher.hash("pw").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("pw", &first));
        assert!(hasher.verify("pw", &second));
    }

    #[test]
    fn test_malformed_digest_does_not_verify() {
        let hasher = fast_hasher(None);
        assert!(!hasher.verify("pw", "not-a-phc-string"));
        assert!(!hasher.verify("pw", ""));
        assert!(!hasher.verify("pw", "$argon2id$v=19$garbage"));
    }

    #[test]
    fn test_pepper_is_applied() {
        let peppered = fast_hasher(Some("pepper_value_0123"));
        let plain = fast_hasher(None);
        let hash = peppered.hash("hunter2").unwrap();

        assert!(peppered.verify("hunter2", &hash));
        assert!(!plain.verify("hunter2", &hash));
    }
}
