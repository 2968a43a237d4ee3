use crate::error::AppError;
use bcrypt::{hash, verify};

/// Hashes a password with bcrypt. The cost factor comes from configuration so
/// deployments can tune it without a rebuild.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// Checks a password against a stored bcrypt digest using bcrypt's own
/// comparison.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
}
