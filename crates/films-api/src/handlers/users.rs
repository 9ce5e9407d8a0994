//! User handlers.
//!
//! - `POST /user/signup` - Register a user (public)
//! - `POST /user/login` - Exchange credentials for a bearer token (public)

use crate::auth::TOKEN_TTL_SECONDS;
use crate::errors::ApiError;
use crate::handlers::{decode_json, BLANK_MESSAGE};
use crate::models::{CreatedResponse, TokenResponse};
use crate::routes::AppState;
use crate::services::user_service;
use crate::validation::{self, Validator, USERNAME_RX};
use axum::{
    body::Bytes,
    extract::State,
    http::{header::AUTHORIZATION, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::instrument;

const PASSWORD_MIN_CHARS: usize = 8;
const PASSWORD_MAX_CHARS: usize = 24;

/// Name and password, as sent to both signup and login.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct CredentialsRequest {
    pub name: String,
    pub password: String,
}

impl fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("name", &self.name)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl CredentialsRequest {
    /// Checks applied on signup. Password rules are evaluated in order, so
    /// the reported message is the first one that fails.
    fn validate_signup(&self) -> Validator {
        let mut v = Validator::new();
        v.check_field(validation::not_blank(&self.name), "name", BLANK_MESSAGE);
        v.check_field(
            validation::matches(&self.name, &USERNAME_RX),
            "name",
            "This field must start with a letter",
        );
        v.check_field(validation::not_blank(&self.password), "password", BLANK_MESSAGE);
        v.check_field(
            validation::min_chars(&self.password, PASSWORD_MIN_CHARS),
            "password",
            "Password must be at least 8 characters long",
        );
        v.check_field(
            validation::max_chars(&self.password, PASSWORD_MAX_CHARS),
            "password",
            "Password must be at most 24 characters long",
        );
        v.check_field(
            validation::is_strong_password(&self.password),
            "password",
            "Password must contain an uppercase letter, a lowercase letter, a digit and a symbol",
        );
        v
    }

    fn validate_login(&self) -> Validator {
        let mut v = Validator::new();
        v.check_field(validation::not_blank(&self.name), "name", BLANK_MESSAGE);
        v.check_field(validation::not_blank(&self.password), "password", BLANK_MESSAGE);
        v
    }
}

/// Handler for POST /user/signup
///
/// # Response
///
/// - 200 OK: `{"id": n}`
/// - 400 Bad Request: Body is not valid JSON
/// - 409 Conflict: Name already registered
/// - 422 Unprocessable Entity: Field errors
#[instrument(skip_all, name = "films.user.signup")]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<CreatedResponse>, ApiError> {
    let request: CredentialsRequest = decode_json(&body, "signup")?;
    request.validate_signup().into_result()?;

    let user_id = user_service::register_user(
        state.users.as_ref(),
        &request.name,
        &request.password,
        state.config.bcrypt_cost,
    )
    .await?;

    Ok(Json(CreatedResponse { id: user_id.0 }))
}

/// Handler for POST /user/login
///
/// # Response
///
/// - 200 OK: `Authorization: Bearer <token>` header and a token body
/// - 400 Bad Request: Body is not valid JSON
/// - 401 Unauthorized: Unknown name or wrong password
/// - 422 Unprocessable Entity: Blank name or password
#[instrument(skip_all, name = "films.user.login")]
pub async fn login(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Response, ApiError> {
    let request: CredentialsRequest = decode_json(&body, "login")?;
    request.validate_login().into_result()?;

    let user_id =
        user_service::authenticate_user(state.users.as_ref(), &request.name, &request.password)
            .await?;
    let token = state.tokens.issue_token(user_id)?;

    let header_value = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| ApiError::Internal(format!("Token is not a valid header value: {}", e)))?;

    tracing::info!(target: "films.handlers.users", user_id = %user_id, "User logged in");

    let body = TokenResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: TOKEN_TTL_SECONDS.unsigned_abs(),
    };
    Ok(([(AUTHORIZATION, header_value)], Json(body)).into_response())
}
