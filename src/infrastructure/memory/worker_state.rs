use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tokio::sync::RwLock;

use crate::domain::entities::WorkerState;
use crate::domain::repositories::WorkerStateRepository;
use crate::error::AppError;

/// Worker states in a map, with the same version check as the SQL store.
#[derive(Debug, Default)]
pub struct InMemoryWorkerStateRepository {
    states: RwLock<HashMap<String, WorkerState>>,
}

impl InMemoryWorkerStateRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkerStateRepository for InMemoryWorkerStateRepository {
    async fn find_by_worker_id(&self, worker_id: &str) -> Result<Option<WorkerState>, AppError> {
        Ok(self.states.read().await.get(worker_id).cloned())
    }

    async fn save(&self, state: &WorkerState) -> Result<(), AppError> {
        let mut states = self.states.write().await;

        let stale = || {
            AppError::conflict(
                format!(
                    "worker state '{}' was modified concurrently (expected version {})",
                    state.worker_id, state.version
                ),
                None,
            )
        };

        let mut stored = state.clone();
        stored.version = state.version + 1;

        match states.entry(state.worker_id.clone()) {
            Entry::Vacant(slot) if state.version == 0 => {
                slot.insert(stored);
            }
            Entry::Occupied(mut slot) if slot.get().version == state.version => {
                slot.insert(stored);
            }
            _ => return Err(stale()),
        }

        Ok(())
    }
}
