use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Identifier of a registered user.
///
/// Carried in the `sub` claim of bearer tokens and in [`crate::auth::AuthContext`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type MovieId = i64;
pub type FavouriteId = i64;

/// User model (maps to users table)
#[derive(Clone, FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Custom Debug implementation that redacts the password hash.
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Movie model (maps to movies table)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub director: String,
    pub release_date: NaiveDate,
    pub cast: Vec<String>,
    pub genre: String,
    pub synopsis: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to create a movie; the owner is supplied separately.
#[derive(Debug, Clone)]
pub struct NewMovie {
    pub title: String,
    pub director: String,
    pub release_date: NaiveDate,
    pub cast: Vec<String>,
    pub genre: String,
    pub synopsis: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedBy {
    pub name: String,
    pub user_id: UserId,
}

/// A movie together with the user who created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieWithAuthor {
    pub movie: Movie,
    pub created_by: CreatedBy,
}

/// Optional filters for the movie listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieFilter {
    /// Substring match on the title.
    pub title: Option<String>,
    /// Exact match on the genre.
    pub genre: Option<String>,
    /// Release year.
    pub year: Option<i32>,
}

impl MovieFilter {
    pub fn matches(&self, movie: &Movie) -> bool {
        use chrono::Datelike;

        self.title
            .as_deref()
            .is_none_or(|title| movie.title.contains(title))
            && self
                .genre
                .as_deref()
                .is_none_or(|genre| movie.genre == genre)
            && self
                .year
                .is_none_or(|year| movie.release_date.year() == year)
    }
}

/// A favourite entry joined with its movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavouriteMovie {
    pub favourite_id: FavouriteId,
    pub movie: Movie,
}

/// Response body for endpoints that create a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
}

/// Token response returned by the login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}
