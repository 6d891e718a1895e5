//! Secret hashing for retailer API keys and admin passwords.
//!
//! Argon2id in PHC string format. Each hash uses a fresh random salt, so the
//! same plaintext produces a different hash on every call. Verification is
//! the constant-time check provided by the `argon2` crate; a mismatch is a
//! normal `false`, never an error.

use anyhow::anyhow;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};

use crate::error::{AppError, Result};

/// Hash a plaintext secret with a fresh random salt.
pub fn hash_secret(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow!("Failed to hash secret: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a plaintext secret against a stored PHC-format hash.
///
/// Returns `false` on mismatch and on a malformed stored hash — a malformed
/// hash is a provisioning defect, logged but never surfaced to the caller.
pub fn verify_secret(plain: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("Stored secret hash is malformed: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}
