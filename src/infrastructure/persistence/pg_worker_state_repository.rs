//! PostgreSQL implementation of the worker state repository.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use tracing::warn;

use crate::domain::entities::{AllocatedRange, WorkerState};
use crate::domain::repositories::WorkerStateRepository;
use crate::error::AppError;

#[derive(FromRow)]
struct RangeRow {
    partition_number: i64,
    counter: i64,
    exhausted: bool,
}

impl From<RangeRow> for AllocatedRange {
    fn from(row: RangeRow) -> Self {
        Self {
            partition_number: row.partition_number,
            counter: row.counter,
            exhausted: row.exhausted,
        }
    }
}

/// Worker states in `worker_states` with their ranges in `allocated_ranges`.
///
/// `save` runs in one transaction: a compare-and-set on `version`, then an
/// upsert of every range by position.
pub struct PgWorkerStateRepository {
    pool: Arc<PgPool>,
}

impl PgWorkerStateRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkerStateRepository for PgWorkerStateRepository {
    async fn find_by_worker_id(&self, worker_id: &str) -> Result<Option<WorkerState>, AppError> {
        let version: Option<i64> =
            sqlx::query_scalar("SELECT version FROM worker_states WHERE worker_id = $1")
                .bind(worker_id)
                .fetch_optional(self.pool.as_ref())
                .await?;

        let Some(version) = version else {
            return Ok(None);
        };

        let rows: Vec<RangeRow> = sqlx::query_as(
            r#"
            SELECT partition_number, counter, exhausted
            FROM allocated_ranges
            WHERE worker_id = $1
            ORDER BY position
            "#,
        )
        .bind(worker_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(Some(WorkerState {
            worker_id: worker_id.to_string(),
            allocated_ranges: rows.into_iter().map(AllocatedRange::from).collect(),
            version,
        }))
    }

    async fn save(&self, state: &WorkerState) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        if state.version == 0 {
            sqlx::query("INSERT INTO worker_states (worker_id, version) VALUES ($1, 1)")
                .bind(&state.worker_id)
                .execute(&mut *tx)
                .await?;
        } else {
            let updated = sqlx::query(
                r#"
                UPDATE worker_states
                SET version = version + 1, updated_at = NOW()
                WHERE worker_id = $1 AND version = $2
                "#,
            )
            .bind(&state.worker_id)
            .bind(state.version)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                warn!(
                    worker_id = %state.worker_id,
                    version = state.version,
                    "Worker state changed since it was read"
                );
                return Err(AppError::conflict(
                    format!(
                        "worker state '{}' was modified concurrently (expected version {})",
                        state.worker_id, state.version
                    ),
                    None,
                ));
            }
        }

        for (position, range) in state.allocated_ranges.iter().enumerate() {
            let position = i32::try_from(position).map_err(|_| {
                AppError::storage_unavailable("too many ranges for one worker", None)
            })?;

            sqlx::query(
                r#"
                INSERT INTO allocated_ranges
                    (worker_id, position, partition_number, counter, exhausted)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (worker_id, position) DO UPDATE
                    SET counter = EXCLUDED.counter,
                        exhausted = EXCLUDED.exhausted
                "#,
            )
            .bind(&state.worker_id)
            .bind(position)
            .bind(range.partition_number)
            .bind(range.counter)
            .bind(range.exhausted)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
