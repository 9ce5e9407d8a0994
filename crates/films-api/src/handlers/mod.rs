//! HTTP request handlers.
//!
//! Request bodies are decoded manually so malformed JSON is a 400 rather
//! than axum's default rejection, then checked with a
//! [`Validator`](crate::validation::Validator) before any storage access.

pub mod favourites;
pub mod health;
pub mod metrics;
pub mod movies;
pub mod users;

pub use favourites::{add_favourite, list_favourites, remove_favourite};
pub use health::health_check;
pub use metrics::metrics_handler;
pub use movies::{create_movie, delete_movie, get_movie, list_movies, update_movie};
pub use users::{login, signup};

use crate::errors::ApiError;
use crate::validation::is_positive_integer_literal;
use serde::de::DeserializeOwned;

pub(crate) const BLANK_MESSAGE: &str = "This field must not be blank";

/// Decode a JSON request body, mapping any failure to 400.
pub(crate) fn decode_json<T: DeserializeOwned>(body: &[u8], target: &str) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(target: "films.handlers", error = %e, "Invalid request body");
        ApiError::BadRequest(format!("Invalid {} body", target))
    })
}

/// Parse a path id. Anything but a positive integer is `NotFound`.
pub(crate) fn parse_id(raw: &str) -> Result<i64, ApiError> {
    if !is_positive_integer_literal(raw) {
        return Err(ApiError::NotFound);
    }
    raw.parse().map_err(|_| ApiError::NotFound)
}
