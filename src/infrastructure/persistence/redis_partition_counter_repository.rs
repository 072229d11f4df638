//! Redis implementation of the partition counter.

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};

use crate::domain::repositories::PartitionCounterRepository;
use crate::error::AppError;
use crate::infrastructure::cache::connect_manager;

/// Partition counter kept in a single Redis key.
///
/// `INCR` is atomic on the server and creates the key at 0 before
/// incrementing, so the first allocation returns 1.
pub struct RedisPartitionCounterRepository {
    conn: ConnectionManager,
    key: String,
}

impl RedisPartitionCounterRepository {
    /// Connects to Redis; the counter lives under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`] if the connection fails.
    pub async fn connect(redis_url: &str, key: impl Into<String>) -> Result<Self, AppError> {
        let conn = connect_manager(redis_url).await?;
        Ok(Self::new(conn, key))
    }

    /// Wraps an existing connection manager.
    pub fn new(conn: ConnectionManager, key: impl Into<String>) -> Self {
        Self {
            conn,
            key: key.into(),
        }
    }
}

#[async_trait]
impl PartitionCounterRepository for RedisPartitionCounterRepository {
    async fn increment_and_fetch(&self) -> Result<i64, AppError> {
        let mut conn = self.conn.clone();
        let value: i64 = conn.incr(&self.key, 1i64).await?;
        Ok(value)
    }

    async fn current(&self) -> Result<i64, AppError> {
        let mut conn = self.conn.clone();
        let value: Option<i64> = conn.get(&self.key).await?;
        Ok(value.unwrap_or(0))
    }
}
