//! Password hashing and verification using Argon2id.
//!
//! Methods return handler errors so they can be used directly in request
//! handlers.

use argon2::password_hash::{Error as ArgonError, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier};
use rand::Rng;
use rand::distr::Alphanumeric;

use crate::handler::{ErrorKind, Result};

const TRACING_TARGET_PASSWORD_HASHER: &str = "soul_server::service::password_hasher";

/// Argon2id hasher with default parameters.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Creates a new [`PasswordHasher`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Hashes a password with a fresh random salt.
    ///
    /// The result is a PHC string that carries the algorithm, its parameters
    /// and the salt, so it can be stored as is.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::encode_b64(&rand::random::<[u8; 16]>()).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_PASSWORD_HASHER,
                error = %e,
                "failed to encode password salt"
            );

            ErrorKind::InternalServerError
                .with_message("Password processing failed")
                .with_context("Salt generation error")
                .with_resource("authentication")
        })?;

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET_PASSWORD_HASHER,
                    error = %e,
                    "password hashing failed"
                );

                ErrorKind::InternalServerError
                    .with_message("Password processing failed")
                    .with_context("Hash generation error")
                    .with_resource("authentication")
            })?;

        Ok(password_hash.to_string())
    }

    /// Verifies a password against a stored PHC hash.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Unauthorized`] when the password does not match.
    /// - [`ErrorKind::InternalServerError`] when the stored hash is unreadable.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<()> {
        let parsed_hash = PasswordHash::new(stored_hash).map_err(|e| {
            tracing::warn!(
                target: TRACING_TARGET_PASSWORD_HASHER,
                error = %e,
                "stored password hash is malformed"
            );

            ErrorKind::InternalServerError
                .with_message("Authentication is temporarily unavailable")
                .with_context("Hash format error")
                .with_resource("authentication")
        })?;

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(()),
            Err(ArgonError::Password) => {
                tracing::debug!(
                    target: TRACING_TARGET_PASSWORD_HASHER,
                    "password does not match"
                );

                Err(ErrorKind::Unauthorized
                    .with_message("Incorrect username or password")
                    .with_resource("authentication"))
            }
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET_PASSWORD_HASHER,
                    error = %e,
                    "password verification failed"
                );

                Err(ErrorKind::InternalServerError
                    .with_message("Authentication is temporarily unavailable")
                    .with_context("Verification error")
                    .with_resource("authentication"))
            }
        }
    }

    /// Hashes and verifies a throwaway password.
    ///
    /// Called when the username is unknown so that the response time does
    /// not reveal whether an account exists. Always returns `false`.
    pub fn verify_dummy_password(&self, password: &str) -> bool {
        let mut rng = rand::rng();
        let length = rng.random_range(16..32);
        let dummy_password: String = (0..length)
            .map(|_| rng.sample(Alphanumeric) as char)
            .collect();

        if let Ok(dummy_hash) = self.hash_password(&dummy_password) {
            let _ = self.verify_password(password, &dummy_hash);
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_password() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash_password("correct horse battery")?;

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password("correct horse battery", &hash).is_ok());

        Ok(())
    }

    #[test]
    fn salts_are_unique() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new();

        let first = hasher.hash_password("password")?;
        let second = hasher.hash_password("password")?;

        assert_ne!(first, second);
        Ok(())
    }

    #[test]
    fn wrong_password_is_unauthorized() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash_password("password")?;

        let error = hasher.verify_password("passw0rd", &hash).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Unauthorized);

        Ok(())
    }

    #[test]
    fn malformed_hash_is_internal() {
        let hasher = PasswordHasher::new();
        let error = hasher.verify_password("password", "not-a-hash").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
    }

    #[test]
    fn dummy_verification_never_succeeds() {
        let hasher = PasswordHasher::new();
        assert!(!hasher.verify_dummy_password("password"));
    }
}
