//! Credential verifier: one-way password hashing.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

use coledzh_shop_core::Password;

/// Hashing failed inside the password-hash implementation.
#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct HashError(String);

/// One-way, salted password hashing.
pub trait CredentialVerifier: Send + Sync {
    /// Produce a self-describing hash string for storage.
    ///
    /// # Errors
    ///
    /// Returns `HashError` if the underlying algorithm fails.
    fn hash(&self, password: &Password) -> Result<String, HashError>;

    /// Check a password against a stored hash. Malformed hashes never match.
    fn verify(&self, hash: &str, password: &Password) -> bool;
}

/// Argon2id with default parameters and a random salt per hash (PHC string output).
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Verifier;

impl CredentialVerifier for Argon2Verifier {
    fn hash(&self, password: &Password) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.expose().as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| HashError(e.to_string()))
    }

    fn verify(&self, hash: &str, password: &Password) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            tracing::warn!("stored password hash is malformed");
            return false;
        };
        Argon2::default()
            .verify_password(password.expose().as_bytes(), &parsed)
            .is_ok()
    }
}
