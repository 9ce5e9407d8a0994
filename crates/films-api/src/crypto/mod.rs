//! Password hashing.

use crate::config::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::errors::ApiError;
use tracing::instrument;

/// Hash a password with bcrypt.
///
/// # Errors
///
/// Returns `ApiError::Internal` if the cost is outside the accepted range or
/// hashing fails.
#[instrument(skip_all)]
pub fn hash_password(password: &str, cost: u32) -> Result<String, ApiError> {
    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        return Err(ApiError::Internal(format!(
            "Invalid bcrypt cost: {} (must be {}-{})",
            cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST
        )));
    }

    bcrypt::hash(password, cost)
        .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))
}

/// Check a password against a stored bcrypt hash.
///
/// A mismatch and a comparison fault (e.g. a corrupt stored hash) are both
/// `InvalidCredentials`.
#[instrument(skip_all)]
pub fn verify_password(password: &str, hash: &str) -> Result<(), ApiError> {
    match bcrypt::verify(password, hash) {
        Ok(true) => Ok(()),
        Ok(false) => Err(ApiError::InvalidCredentials),
        Err(e) => {
            tracing::warn!(target: "films.crypto", error = %e, "Password hash comparison failed");
            Err(ApiError::InvalidCredentials)
        }
    }
}
