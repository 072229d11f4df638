//! Repository trait for the global partition counter.

use crate::error::AppError;
use async_trait::async_trait;

/// Store contract for the single shared partition counter record.
///
/// Implementations must perform the increment and the read of the new value
/// as one atomic operation visible to every process. A separate read
/// followed by a write is not a valid implementation.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgPartitionCounterRepository`] - PostgreSQL upsert
/// - [`crate::infrastructure::persistence::RedisPartitionCounterRepository`] - Redis `INCR`
/// - [`crate::infrastructure::memory::InMemoryPartitionCounterRepository`] - In-process atomic
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PartitionCounterRepository: Send + Sync {
    /// Increments the counter and returns the new value.
    ///
    /// The record is created lazily: the first call on an empty store
    /// returns 1.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`] if the store cannot complete
    /// the operation, [`AppError::KeyOverflow`] if the counter cannot grow.
    async fn increment_and_fetch(&self) -> Result<i64, AppError>;

    /// Returns the last allocated value without changing it (0 if none).
    ///
    /// Diagnostic only; never use it to derive the next value.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`] on store errors.
    async fn current(&self) -> Result<i64, AppError>;
}
