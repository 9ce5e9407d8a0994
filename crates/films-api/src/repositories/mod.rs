//! Storage access layer.
//!
//! Each store is a trait so handlers can run against Postgres in
//! production and against [`memory::InMemoryStore`] in tests. Every
//! method returns `ApiError` directly: unique violations surface as
//! `DuplicateEntry`, missing rows as `NotFound`, anything else as
//! `Database`.

pub mod favourites;
pub mod memory;
pub mod movies;
pub mod users;

pub use favourites::PgFavouriteRepository;
pub use movies::PgMovieRepository;
pub use users::PgUserRepository;

use crate::errors::ApiError;
use crate::models::{
    FavouriteId, FavouriteMovie, Movie, MovieFilter, MovieId, MovieWithAuthor, NewMovie, User,
    UserId,
};

#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user, returning its id. `DuplicateEntry` if the name is taken.
    async fn insert(&self, name: &str, password_hash: &str) -> Result<UserId, ApiError>;

    async fn get_by_name(&self, name: &str) -> Result<Option<User>, ApiError>;

    async fn exists(&self, id: UserId) -> Result<bool, ApiError>;

    async fn count(&self) -> Result<i64, ApiError>;
}

#[async_trait::async_trait]
pub trait MovieRepository: Send + Sync {
    /// Insert a movie owned by `owner`. `DuplicateEntry` if the title is taken.
    async fn insert(&self, movie: &NewMovie, owner: UserId) -> Result<MovieId, ApiError>;

    /// `NotFound` if no movie has this id.
    async fn get(&self, id: MovieId) -> Result<Movie, ApiError>;

    async fn get_with_author(&self, id: MovieId) -> Result<MovieWithAuthor, ApiError>;

    async fn list(&self, filter: &MovieFilter) -> Result<Vec<Movie>, ApiError>;

    /// Replace the editable fields of `movie` and bump `updated_at`.
    async fn update(&self, movie: &Movie) -> Result<(), ApiError>;

    async fn delete(&self, id: MovieId) -> Result<(), ApiError>;

    async fn count(&self) -> Result<i64, ApiError>;
}

#[async_trait::async_trait]
pub trait FavouriteRepository: Send + Sync {
    /// `NotFound` if the movie does not exist, `DuplicateEntry` if already a favourite.
    async fn insert(&self, user_id: UserId, movie_id: MovieId) -> Result<FavouriteId, ApiError>;

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<FavouriteMovie>, ApiError>;

    /// Remove the user's favourite. `NotFound` if the user has no such favourite.
    async fn remove(&self, id: FavouriteId, user_id: UserId) -> Result<(), ApiError>;
}
