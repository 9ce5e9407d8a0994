//! Favourite handlers. All routes require authentication and act on the
//! requester's own favourites only.
//!
//! - `POST /favourite` - Mark a movie as favourite
//! - `GET /favourites` - List the requester's favourites
//! - `DELETE /favourites/:id` - Remove one of the requester's favourites

use crate::auth::AuthenticatedUser;
use crate::errors::ApiError;
use crate::handlers::{decode_json, parse_id};
use crate::models::{CreatedResponse, FavouriteMovie};
use crate::routes::AppState;
use crate::validation::Validator;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

/// Body of `POST /favourite`. A missing `movie_id` decodes as 0.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FavouriteRequest {
    pub movie_id: i64,
}

impl FavouriteRequest {
    fn validate(&self) -> Validator {
        let mut v = Validator::new();
        v.check_field(
            self.movie_id > 0,
            "movie_id",
            "This field must be a positive integer",
        );
        v
    }
}

/// Handler for POST /favourite
///
/// # Response
///
/// - 200 OK: `{"id": n}`
/// - 400 Bad Request: Invalid JSON
/// - 404 Not Found: No such movie
/// - 409 Conflict: Already a favourite
/// - 422 Unprocessable Entity: `movie_id` is not a positive integer
#[instrument(skip_all, name = "films.favourite.add")]
pub async fn add_favourite(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    body: Bytes,
) -> Result<Json<CreatedResponse>, ApiError> {
    let request: FavouriteRequest = decode_json(&body, "favourite")?;
    request.validate().into_result()?;

    let id = state.favourites.insert(user_id, request.movie_id).await?;
    Ok(Json(CreatedResponse { id }))
}

/// Handler for GET /favourites
///
/// # Response
///
/// - 200 OK: JSON array of favourites with their movies
/// - 404 Not Found: The requester has no favourites
#[instrument(skip_all, name = "films.favourite.list")]
pub async fn list_favourites(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<Json<Vec<FavouriteMovie>>, ApiError> {
    let favourites = state.favourites.list_for_user(user_id).await?;
    if favourites.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(favourites))
}

/// Handler for DELETE /favourites/:id
///
/// # Response
///
/// - 200 OK: Favourite removed
/// - 404 Not Found: The requester has no favourite with this id
#[instrument(skip_all, name = "films.favourite.remove")]
pub async fn remove_favourite(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.favourites.remove(id, user_id).await?;
    Ok(StatusCode::OK)
}
