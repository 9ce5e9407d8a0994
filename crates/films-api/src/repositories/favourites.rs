//! Favourites repository backed by Postgres.
//!
//! `(user_id, movie_id)` is unique; the movie foreign key turns a missing
//! movie into `NotFound`.

use crate::errors::ApiError;
use crate::models::{FavouriteId, FavouriteMovie, Movie, MovieId, UserId};
use crate::repositories::FavouriteRepository;
use sqlx::{FromRow, PgPool};
use tracing::instrument;

#[derive(FromRow)]
struct FavouriteRow {
    favourite_id: FavouriteId,
    #[sqlx(flatten)]
    movie: Movie,
}

#[derive(Debug, Clone)]
pub struct PgFavouriteRepository {
    pool: PgPool,
}

impl PgFavouriteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FavouriteRepository for PgFavouriteRepository {
    #[instrument(skip_all, name = "films.repo.insert_favourite", fields(movie_id = movie_id))]
    async fn insert(&self, user_id: UserId, movie_id: MovieId) -> Result<FavouriteId, ApiError> {
        let id: FavouriteId = sqlx::query_scalar(
            r#"
            INSERT INTO favourites (user_id, movie_id)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(movie_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    #[instrument(skip_all, name = "films.repo.list_favourites")]
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<FavouriteMovie>, ApiError> {
        let rows = sqlx::query_as::<_, FavouriteRow>(
            r#"
            SELECT f.id AS favourite_id,
                   m.id, m.title, m.director, m.release_date, m."cast", m.genre,
                   m.synopsis, m.user_id, m.created_at, m.updated_at
            FROM favourites f
            JOIN movies m ON m.id = f.movie_id
            WHERE f.user_id = $1
            ORDER BY f.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| FavouriteMovie {
                favourite_id: row.favourite_id,
                movie: row.movie,
            })
            .collect())
    }

    #[instrument(skip_all, name = "films.repo.remove_favourite", fields(favourite_id = id))]
    async fn remove(&self, id: FavouriteId, user_id: UserId) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM favourites WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }
}
