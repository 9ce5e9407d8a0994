//! Movie handlers. All routes require authentication.
//!
//! - `GET /movies` - List movies, optionally filtered by title, genre and year
//! - `POST /movie` - Create a movie owned by the requester
//! - `GET /movie/:id` - Fetch a movie with its creator
//! - `PUT /movie/:id` - Partially update a movie (owner only)
//! - `DELETE /movie/:id` - Delete a movie (owner only)

use crate::auth::AuthenticatedUser;
use crate::errors::ApiError;
use crate::handlers::{decode_json, parse_id, BLANK_MESSAGE};
use crate::models::{CreatedResponse, Movie, MovieFilter, MovieWithAuthor, NewMovie};
use crate::routes::AppState;
use crate::validation::{self, Validator};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

const RELEASE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Body of `POST /movie` and `PUT /movie/:id`.
///
/// Missing fields decode as blank. On update, blank fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MovieRequest {
    pub title: String,
    pub director: String,
    pub release_date: String,
    pub cast: Vec<String>,
    pub genre: String,
    pub synopsis: String,
}

impl MovieRequest {
    fn validate(&self) -> Validator {
        let mut v = Validator::new();
        v.check_field(validation::not_blank(&self.title), "title", BLANK_MESSAGE);
        v.check_field(validation::not_blank(&self.director), "director", BLANK_MESSAGE);
        v.check_field(validation::not_blank(&self.genre), "genre", BLANK_MESSAGE);
        v.check_field(validation::not_blank(&self.synopsis), "synopsis", BLANK_MESSAGE);
        v.check_field(
            validation::not_empty(&self.cast),
            "cast",
            "This field must not be empty",
        );
        v
    }

    /// Overwrite every field of `movie` that this request sets.
    fn apply_to(self, movie: &mut Movie) -> Result<(), ApiError> {
        if validation::not_blank(&self.release_date) {
            movie.release_date = parse_release_date(&self.release_date)?;
        }
        if validation::not_blank(&self.title) {
            movie.title = self.title;
        }
        if validation::not_blank(&self.director) {
            movie.director = self.director;
        }
        if validation::not_empty(&self.cast) {
            movie.cast = self.cast;
        }
        if validation::not_blank(&self.genre) {
            movie.genre = self.genre;
        }
        if validation::not_blank(&self.synopsis) {
            movie.synopsis = self.synopsis;
        }
        Ok(())
    }
}

/// Query string of `GET /movies`. Empty values are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ListMoviesQuery {
    pub title: Option<String>,
    pub genre: Option<String>,
    pub year: Option<String>,
}

impl ListMoviesQuery {
    fn into_filter(self) -> Result<MovieFilter, ApiError> {
        let year = match self.year.filter(|y| !y.is_empty()) {
            None => None,
            Some(raw) => {
                if !validation::is_positive_integer_literal(&raw) {
                    return Err(ApiError::BadRequest(format!("Invalid year: {}", raw)));
                }
                Some(
                    raw.parse::<i32>()
                        .map_err(|_| ApiError::BadRequest(format!("Invalid year: {}", raw)))?,
                )
            }
        };

        Ok(MovieFilter {
            title: self.title.filter(|t| !t.is_empty()),
            genre: self.genre.filter(|g| !g.is_empty()),
            year,
        })
    }
}

fn parse_release_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, RELEASE_DATE_FORMAT)
        .map_err(|_| ApiError::BadRequest(format!("Invalid release date: {}", raw)))
}

/// Handler for GET /movies
///
/// # Response
///
/// - 200 OK: JSON array of movies
/// - 400 Bad Request: `year` is not a positive integer
#[instrument(skip_all, name = "films.movie.list")]
pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListMoviesQuery>,
) -> Result<Json<Vec<Movie>>, ApiError> {
    let filter = query.into_filter()?;
    let movies = state.movies.list(&filter).await?;
    Ok(Json(movies))
}

/// Handler for POST /movie
///
/// # Response
///
/// - 200 OK: `{"id": n}`
/// - 400 Bad Request: Invalid JSON or release date
/// - 409 Conflict: Title already exists
/// - 422 Unprocessable Entity: Field errors
#[instrument(skip_all, name = "films.movie.create")]
pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    body: Bytes,
) -> Result<Json<CreatedResponse>, ApiError> {
    let request: MovieRequest = decode_json(&body, "movie")?;
    let release_date = parse_release_date(&request.release_date)?;
    request.validate().into_result()?;

    let movie = NewMovie {
        title: request.title,
        director: request.director,
        release_date,
        cast: request.cast,
        genre: request.genre,
        synopsis: request.synopsis,
    };
    let id = state.movies.insert(&movie, user_id).await?;

    tracing::info!(target: "films.handlers.movies", movie_id = id, user_id = %user_id, "Movie created");
    Ok(Json(CreatedResponse { id }))
}

/// Handler for GET /movie/:id
#[instrument(skip_all, name = "films.movie.get")]
pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MovieWithAuthor>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.movies.get_with_author(id).await?))
}

/// Handler for PUT /movie/:id
///
/// # Response
///
/// - 200 OK: Movie updated
/// - 400 Bad Request: Invalid JSON or release date
/// - 403 Forbidden: Requester did not create the movie
/// - 404 Not Found: No such movie
/// - 409 Conflict: New title already exists
#[instrument(skip_all, name = "films.movie.update")]
pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    let request: MovieRequest = decode_json(&body, "movie")?;

    let mut movie = state.movies.get(id).await?;
    if movie.user_id != user_id {
        tracing::debug!(target: "films.handlers.movies", movie_id = id, user_id = %user_id, "Update by non-owner");
        return Err(ApiError::Forbidden);
    }

    request.apply_to(&mut movie)?;
    state.movies.update(&movie).await?;
    Ok(StatusCode::OK)
}

/// Handler for DELETE /movie/:id
///
/// # Response
///
/// - 200 OK: Movie deleted
/// - 403 Forbidden: Requester did not create the movie
/// - 404 Not Found: No such movie
#[instrument(skip_all, name = "films.movie.delete")]
pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;

    let movie = state.movies.get(id).await?;
    if movie.user_id != user_id {
        tracing::debug!(target: "films.handlers.movies", movie_id = id, user_id = %user_id, "Delete by non-owner");
        return Err(ApiError::Forbidden);
    }

    state.movies.delete(id).await?;
    tracing::info!(target: "films.handlers.movies", movie_id = id, "Movie deleted");
    Ok(StatusCode::OK)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::UserId;
    use chrono::Utc;

    fn full_request() -> MovieRequest {
        MovieRequest {
            title: "Heat".to_string(),
            director: "Michael Mann".to_string(),
            release_date: "1995-12-15".to_string(),
            cast: vec!["Al Pacino".to_string(), "Robert De Niro".to_string()],
            genre: "Crime".to_string(),
            synopsis: "A detective hunts a crew of thieves.".to_string(),
        }
    }

    fn stored_movie() -> Movie {
        Movie {
            id: 1,
            title: "Old".to_string(),
            director: "Someone".to_string(),
            release_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            cast: vec!["Actor".to_string()],
            genre: "Drama".to_string(),
            synopsis: "Old synopsis".to_string(),
            user_id: UserId(1),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_validate_full_request() {
        assert!(full_request().validate().is_valid());
    }

    #[test]
    fn test_validate_reports_every_field() {
        let v = MovieRequest::default().validate();
        let fields: Vec<&str> = v.field_errors().keys().map(String::as_str).collect();
        assert_eq!(fields, ["cast", "director", "genre", "synopsis", "title"]);
    }

    #[test]
    fn test_parse_release_date() {
        assert_eq!(
            parse_release_date("2010-07-16").unwrap(),
            NaiveDate::from_ymd_opt(2010, 7, 16).unwrap()
        );
        for raw in ["", "16/07/2010", "2010-13-01", "2010-02-30"] {
            assert!(matches!(parse_release_date(raw), Err(ApiError::BadRequest(_))), "{}", raw);
        }
    }

    #[test]
    fn test_apply_to_only_overwrites_set_fields() {
        let mut movie = stored_movie();
        let request = MovieRequest {
            title: "New".to_string(),
            genre: "  ".to_string(),
            ..Default::default()
        };
        request.apply_to(&mut movie).unwrap();

        assert_eq!(movie.title, "New");
        assert_eq!(movie.genre, "Drama");
        assert_eq!(movie.cast, ["Actor"]);
        assert_eq!(movie.release_date, NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
    }

    #[test]
    fn test_apply_to_rejects_bad_date_without_changes() {
        let mut movie = stored_movie();
        let request = MovieRequest {
            title: "New".to_string(),
            release_date: "yesterday".to_string(),
            ..Default::default()
        };
        assert!(matches!(request.apply_to(&mut movie), Err(ApiError::BadRequest(_))));
        assert_eq!(movie.title, "Old");
    }

    #[test]
    fn test_list_query_into_filter() {
        let filter = ListMoviesQuery {
            title: Some("".to_string()),
            genre: Some("Crime".to_string()),
            year: Some("1994".to_string()),
        }
        .into_filter()
        .unwrap();

        assert_eq!(
            filter,
            MovieFilter {
                title: None,
                genre: Some("Crime".to_string()),
                year: Some(1994),
            }
        );
    }

    #[test]
    fn test_list_query_rejects_bad_year() {
        for year in ["abc", "0", "-1", "99999999999"] {
            let query = ListMoviesQuery {
                year: Some(year.to_string()),
                ..Default::default()
            };
            assert!(matches!(query.into_filter(), Err(ApiError::BadRequest(_))), "{}", year);
        }
    }
}
