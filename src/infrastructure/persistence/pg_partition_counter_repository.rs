//! PostgreSQL implementation of the partition counter.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::repositories::PartitionCounterRepository;
use crate::error::AppError;

/// Name of the counter row used for range partitions.
pub const RANGE_PARTITION_COUNTER: &str = "range_partition";

/// Partition counter stored as one row of `partition_counters`.
///
/// The increment is a single `INSERT .. ON CONFLICT DO UPDATE .. RETURNING`
/// statement: Postgres takes the row lock, bumps the value and returns it in
/// one round-trip, and creates the row on first use.
pub struct PgPartitionCounterRepository {
    pool: Arc<PgPool>,
    name: String,
}

impl PgPartitionCounterRepository {
    /// Creates a repository for the default range partition counter.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self::with_name(pool, RANGE_PARTITION_COUNTER)
    }

    /// Creates a repository for a named counter row.
    pub fn with_name(pool: Arc<PgPool>, name: impl Into<String>) -> Self {
        Self {
            pool,
            name: name.into(),
        }
    }
}

#[async_trait]
impl PartitionCounterRepository for PgPartitionCounterRepository {
    async fn increment_and_fetch(&self) -> Result<i64, AppError> {
        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO partition_counters (name, last_allocated_partition)
            VALUES ($1, 1)
            ON CONFLICT (name) DO UPDATE
                SET last_allocated_partition = partition_counters.last_allocated_partition + 1
            RETURNING last_allocated_partition
            "#,
        )
        .bind(&self.name)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(value)
    }

    async fn current(&self) -> Result<i64, AppError> {
        let value: Option<i64> = sqlx::query_scalar(
            "SELECT last_allocated_partition FROM partition_counters WHERE name = $1",
        )
        .bind(&self.name)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(value.unwrap_or(0))
    }
}
