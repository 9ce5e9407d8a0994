//! Users repository backed by Postgres.

use crate::errors::ApiError;
use crate::models::{User, UserId};
use crate::repositories::UserRepository;
use sqlx::PgPool;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip_all, name = "films.repo.insert_user")]
    async fn insert(&self, name: &str, password_hash: &str) -> Result<UserId, ApiError> {
        let id: UserId = sqlx::query_scalar(
            r#"
            INSERT INTO users (name, password_hash)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    #[instrument(skip_all, name = "films.repo.get_user_by_name")]
    async fn get_by_name(&self, name: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, password_hash, created_at
            FROM users
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[instrument(skip_all, name = "films.repo.user_exists", fields(user_id = %id))]
    async fn exists(&self, id: UserId) -> Result<bool, ApiError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn count(&self) -> Result<i64, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
