//! Films API error types.
//!
//! All errors map to HTTP status codes via the `IntoResponse` impl. Bodies
//! are the canonical status text, except validation failures which carry
//! the field error map as JSON. Internal details are logged server-side
//! and never returned to clients.

use crate::auth::{InvalidReason, TokenError};
use crate::validation::Validator;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::backtrace::Backtrace;
use thiserror::Error;

const WWW_AUTHENTICATE_VALUE: &str = "Bearer realm=\"films-api\"";

/// Films API error type.
///
/// Maps to HTTP status codes:
/// - Token: 400 or 401 depending on the failure, 500 for signing faults
/// - NotAuthenticated, InvalidCredentials: 401 Unauthorized
/// - Forbidden: 403 Forbidden
/// - NotFound: 404 Not Found
/// - DuplicateEntry: 409 Conflict
/// - BadRequest: 400 Bad Request
/// - Validation: 422 Unprocessable Entity
/// - Database, Internal: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    #[error("Duplicate entry")]
    DuplicateEntry,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed")]
    Validation(Validator),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Token(err) => match err {
                TokenError::MissingAuthHeader
                | TokenError::TokenExpired
                | TokenError::InvalidToken(InvalidReason::Integrity) => StatusCode::UNAUTHORIZED,
                TokenError::MalformedAuthHeader
                | TokenError::InvalidToken(InvalidReason::ClaimShape) => StatusCode::BAD_REQUEST,
                TokenError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::NotAuthenticated | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::DuplicateEntry => StatusCode::CONFLICT,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            // Runs inside the request span, so method and URI are attached.
            tracing::error!(
                target: "films.errors",
                error = %self,
                backtrace = %Backtrace::capture(),
                "Request failed with internal error"
            );
        } else if !matches!(self, ApiError::Validation(_)) {
            tracing::debug!(target: "films.errors", error = %self, status = status.as_u16(), "Client error");
        }

        let mut response = match self {
            ApiError::Validation(validator) => (status, Json(validator)).into_response(),
            _ => (status, status.canonical_reason().unwrap_or_default()).into_response(),
        };

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(WWW_AUTHENTICATE_VALUE),
            );
        }

        response
    }
}

/// Convert sqlx errors to ApiError
///
/// Unique violations become `DuplicateEntry`, foreign key violations
/// become `NotFound`.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => ApiError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ApiError::DuplicateEntry
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                ApiError::NotFound
            }
            _ => ApiError::Database(err.to_string()),
        }
    }
}
