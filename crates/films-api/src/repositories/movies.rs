//! Movies repository backed by Postgres.
//!
//! `cast` is a reserved word in Postgres and is always quoted.

use crate::errors::ApiError;
use crate::models::{CreatedBy, Movie, MovieFilter, MovieId, MovieWithAuthor, NewMovie, UserId};
use crate::repositories::MovieRepository;
use sqlx::{FromRow, PgPool};
use tracing::instrument;

#[derive(FromRow)]
struct MovieAuthorRow {
    #[sqlx(flatten)]
    movie: Movie,
    author_name: String,
}

#[derive(Debug, Clone)]
pub struct PgMovieRepository {
    pool: PgPool,
}

impl PgMovieRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MovieRepository for PgMovieRepository {
    #[instrument(skip_all, name = "films.repo.insert_movie")]
    async fn insert(&self, movie: &NewMovie, owner: UserId) -> Result<MovieId, ApiError> {
        let id: MovieId = sqlx::query_scalar(
            r#"
            INSERT INTO movies (title, director, release_date, "cast", genre, synopsis, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&movie.title)
        .bind(&movie.director)
        .bind(movie.release_date)
        .bind(&movie.cast)
        .bind(&movie.genre)
        .bind(&movie.synopsis)
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    #[instrument(skip_all, name = "films.repo.get_movie", fields(movie_id = id))]
    async fn get(&self, id: MovieId) -> Result<Movie, ApiError> {
        sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, title, director, release_date, "cast", genre, synopsis,
                   user_id, created_at, updated_at
            FROM movies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ApiError::NotFound)
    }

    #[instrument(skip_all, name = "films.repo.get_movie_with_author", fields(movie_id = id))]
    async fn get_with_author(&self, id: MovieId) -> Result<MovieWithAuthor, ApiError> {
        let row = sqlx::query_as::<_, MovieAuthorRow>(
            r#"
            SELECT m.id, m.title, m.director, m.release_date, m."cast", m.genre,
                   m.synopsis, m.user_id, m.created_at, m.updated_at,
                   u.name AS author_name
            FROM movies m
            JOIN users u ON u.id = m.user_id
            WHERE m.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ApiError::NotFound)?;

        Ok(MovieWithAuthor {
            created_by: CreatedBy {
                name: row.author_name,
                user_id: row.movie.user_id,
            },
            movie: row.movie,
        })
    }

    #[instrument(skip_all, name = "films.repo.list_movies")]
    async fn list(&self, filter: &MovieFilter) -> Result<Vec<Movie>, ApiError> {
        let movies = sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, title, director, release_date, "cast", genre, synopsis,
                   user_id, created_at, updated_at
            FROM movies
            WHERE ($1::text IS NULL OR strpos(title, $1) > 0)
              AND ($2::text IS NULL OR genre = $2)
              AND ($3::int IS NULL OR EXTRACT(YEAR FROM release_date)::int = $3)
            ORDER BY id
            "#,
        )
        .bind(filter.title.as_deref())
        .bind(filter.genre.as_deref())
        .bind(filter.year)
        .fetch_all(&self.pool)
        .await?;

        Ok(movies)
    }

    #[instrument(skip_all, name = "films.repo.update_movie", fields(movie_id = movie.id))]
    async fn update(&self, movie: &Movie) -> Result<(), ApiError> {
        let result = sqlx::query(
            r#"
            UPDATE movies
            SET title = $2, director = $3, release_date = $4, "cast" = $5,
                genre = $6, synopsis = $7, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(movie.id)
        .bind(&movie.title)
        .bind(&movie.director)
        .bind(movie.release_date)
        .bind(&movie.cast)
        .bind(&movie.genre)
        .bind(&movie.synopsis)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip_all, name = "films.repo.delete_movie", fields(movie_id = id))]
    async fn delete(&self, id: MovieId) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }

    async fn count(&self) -> Result<i64, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movies")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
