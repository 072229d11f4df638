//! Repository trait for per-worker range history.

use crate::domain::entities::WorkerState;
use crate::error::AppError;
use async_trait::async_trait;

/// Store contract for [`WorkerState`] records keyed by worker identity.
///
/// Writes are optimistic: `save` succeeds only if the stored version still
/// equals `state.version` (or no record exists when `state.version == 0`).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkerStateRepository: Send + Sync {
    /// Finds the state of a worker.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(state))` if the worker has allocated before
    /// - `Ok(None)` for a worker identity never seen
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`] on store errors.
    async fn find_by_worker_id(&self, worker_id: &str) -> Result<Option<WorkerState>, AppError>;

    /// Persists the state, including every allocated range.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DuplicateKeyConflict`] if another writer updated
    /// the record since it was read, or if a range's partition is already
    /// owned by another worker. Returns [`AppError::StorageUnavailable`] on
    /// store errors.
    async fn save(&self, state: &WorkerState) -> Result<(), AppError>;
}
