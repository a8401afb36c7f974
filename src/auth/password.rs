use crate::error::AppError;
use bcrypt::{hash, verify};

/// Hashes `password` with a random salt.
///
/// bcrypt is deliberately slow, so the work runs on the blocking pool instead
/// of stalling an actix worker.
pub async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash(password, cost))
        .await
        .map_err(|e| AppError::InternalServerError(format!("hashing task failed: {}", e)))?
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

pub async fn verify_password(password: String, hashed_password: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify(password, &hashed_password))
        .await
        .map_err(|e| AppError::InternalServerError(format!("verification task failed: {}", e)))?
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
}
