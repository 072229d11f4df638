//! PostgreSQL implementation of the short URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{NewShortUrl, ShortUrl};
use crate::domain::repositories::ShortUrlRepository;
use crate::error::AppError;

#[derive(FromRow)]
struct ShortUrlRow {
    id: i64,
    code: String,
    long_url: String,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    last_access_at: Option<DateTime<Utc>>,
}

impl From<ShortUrlRow> for ShortUrl {
    fn from(row: ShortUrlRow) -> Self {
        Self {
            id: row.id,
            code: row.code,
            long_url: row.long_url,
            created_at: row.created_at,
            expires_at: row.expires_at,
            last_access_at: row.last_access_at,
        }
    }
}

/// PostgreSQL repository for short URL mappings.
///
/// Uniqueness of codes is enforced by the `short_urls_code_key` constraint,
/// which surfaces as [`AppError::DuplicateKeyConflict`].
pub struct PgShortUrlRepository {
    pool: Arc<PgPool>,
}

impl PgShortUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShortUrlRepository for PgShortUrlRepository {
    async fn create(&self, new_short_url: NewShortUrl) -> Result<ShortUrl, AppError> {
        let row: ShortUrlRow = sqlx::query_as(
            r#"
            INSERT INTO short_urls (code, long_url, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, code, long_url, created_at, expires_at, last_access_at
            "#,
        )
        .bind(&new_short_url.code)
        .bind(&new_short_url.long_url)
        .bind(new_short_url.expires_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortUrl>, AppError> {
        let row: Option<ShortUrlRow> = sqlx::query_as(
            r#"
            SELECT id, code, long_url, created_at, expires_at, last_access_at
            FROM short_urls
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(ShortUrl::from))
    }

    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<ShortUrl>, AppError> {
        let row: Option<ShortUrlRow> = sqlx::query_as(
            r#"
            SELECT id, code, long_url, created_at, expires_at, last_access_at
            FROM short_urls
            WHERE long_url = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(long_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(ShortUrl::from))
    }

    async fn record_access(&self, code: &str, at: DateTime<Utc>) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE short_urls SET last_access_at = $2 WHERE code = $1")
            .bind(code)
            .bind(at)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
