//! Password hashing and verification
//!
//! bcrypt with the library's default cost; every hash embeds its own random
//! salt, so hashing the same password twice yields different strings.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::AppError;

/// Hash a password using bcrypt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))
}

/// Verify a password against its hash.
///
/// A wrong password is `Ok(false)`, not an error; only a malformed hash or
/// a primitive failure errors.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::Internal(format!("password verification failed: {}", e)))
}
