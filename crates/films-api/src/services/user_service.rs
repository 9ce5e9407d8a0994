//! User registration and credential checks.

use crate::crypto;
use crate::errors::ApiError;
use crate::models::UserId;
use crate::repositories::UserRepository;
use tracing::instrument;

/// Hash the password and store a new user.
///
/// `DuplicateEntry` if the name is already registered.
#[instrument(skip_all, name = "films.service.register_user")]
pub async fn register_user(
    users: &dyn UserRepository,
    name: &str,
    password: &str,
    bcrypt_cost: u32,
) -> Result<UserId, ApiError> {
    let password_hash = crypto::hash_password(password, bcrypt_cost)?;
    let user_id = users.insert(name, &password_hash).await?;

    tracing::info!(target: "films.service.users", user_id = %user_id, "User registered");
    Ok(user_id)
}

/// Resolve a name and password to a user id.
///
/// Unknown names, wrong passwords and hash comparison faults are all
/// `InvalidCredentials`.
#[instrument(skip_all, name = "films.service.authenticate_user")]
pub async fn authenticate_user(
    users: &dyn UserRepository,
    name: &str,
    password: &str,
) -> Result<UserId, ApiError> {
    let user = users
        .get_by_name(name)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    crypto::verify_password(password, &user.password_hash)?;
    Ok(user.id)
}
