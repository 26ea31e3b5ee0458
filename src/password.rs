//! Delete-password hashing.
//!
//! Passwords are stored as Argon2id PHC strings. Hashing is CPU-bound, so both
//! operations run on tokio's blocking pool.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("password task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Hashes `password` with a fresh random salt.
pub async fn hash_password(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hash(e.to_string()))
    })
    .await?
}

/// Checks `password` against a stored PHC string.
///
/// A stored value that does not parse as a PHC string never matches.
pub async fn verify_password(password: String, stored: String) -> Result<bool, PasswordError> {
    let matches = tokio::task::spawn_blocking(move || match PasswordHash::new(&stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("stored delete_password is not a valid hash: {}", e);
            false
        }
    })
    .await?;

    Ok(matches)
}
