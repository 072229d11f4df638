//! Per-worker key issuance from leased partitions.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use super::partition_service::PartitionService;
use crate::domain::entities::WorkerState;
use crate::domain::repositories::{PartitionCounterRepository, WorkerStateRepository};
use crate::error::AppError;

/// Issues globally unique keys for worker identities.
///
/// Each worker leases whole partitions from the [`PartitionService`] and
/// walks a private counter through them. Calls for the same worker identity
/// are serialized in-process, so no two callers observe the same counter;
/// partitions being disjoint makes keys unique across workers.
pub struct KeyService<W, C>
where
    W: WorkerStateRepository + ?Sized,
    C: PartitionCounterRepository + ?Sized,
{
    worker_states: Arc<W>,
    partitions: Arc<PartitionService<C>>,
    range_size: i64,
    worker_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<W, C> KeyService<W, C>
where
    W: WorkerStateRepository + ?Sized,
    C: PartitionCounterRepository + ?Sized,
{
    /// Creates a new key service issuing `range_size` keys per partition.
    pub fn new(
        worker_states: Arc<W>,
        partitions: Arc<PartitionService<C>>,
        range_size: i64,
    ) -> Self {
        Self {
            worker_states,
            partitions,
            range_size,
            worker_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn range_size(&self) -> i64 {
        self.range_size
    }

    /// Returns the lock serializing updates for `worker_id`.
    async fn worker_lock(&self, worker_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.worker_locks.lock().await;
        locks.entry(worker_id.to_string()).or_default().clone()
    }

    /// Issues the next global key for `worker_id`.
    ///
    /// # Flow
    ///
    /// 1. Load the worker's state (a missing state starts empty)
    /// 2. If no range is active, lease a new partition and append a range
    /// 3. Advance the active range; the last valid counter flags it exhausted
    /// 4. Persist the state, then return `(partition - 1) * RANGE_SIZE + counter`
    ///
    /// # Errors
    ///
    /// Returns [`AppError::KeyOverflow`] if no further partition can be
    /// leased. Store failures propagate unchanged, including
    /// [`AppError::DuplicateKeyConflict`] when another process updated the
    /// same worker state concurrently.
    pub async fn get_new_key(&self, worker_id: &str) -> Result<u64, AppError> {
        let lock = self.worker_lock(worker_id).await;
        let _guard = lock.lock().await;

        let mut state = self
            .worker_states
            .find_by_worker_id(worker_id)
            .await?
            .unwrap_or_else(|| WorkerState::new(worker_id));

        let retired = state.retire_spent_ranges(self.range_size);
        if retired > 0 {
            debug!(worker_id, retired, "Retired spent ranges");
        }

        let index = match state.active_range_index(self.range_size) {
            Some(index) => index,
            None => {
                let partition = self.partitions.allocate_range_partition().await?;
                info!(worker_id, partition, "Leased new range");
                state.push_range(partition)
            }
        };

        let range = &mut state.allocated_ranges[index];
        let key = range.issue_next(self.range_size)?;
        let exhausted = range.exhausted;
        let partition = range.partition_number;

        self.worker_states.save(&state).await?;

        metrics::counter!("keys_issued_total").increment(1);
        if exhausted {
            metrics::counter!("ranges_exhausted_total").increment(1);
            info!(worker_id, partition, "Range exhausted");
        }
        debug!(worker_id, partition, key, "Issued key");

        Ok(key)
    }

    /// Returns the stored state of a worker, if any.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`] on store errors.
    pub async fn worker_state(&self, worker_id: &str) -> Result<Option<WorkerState>, AppError> {
        self.worker_states.find_by_worker_id(worker_id).await
    }
}
