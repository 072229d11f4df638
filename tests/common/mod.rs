#![allow(dead_code)]

use std::sync::Arc;

use chrono::Duration;
use range_shortener::application::services::{KeyService, PartitionService, ShortUrlService};
use range_shortener::infrastructure::cache::NullCache;
use range_shortener::infrastructure::memory::{
    InMemoryPartitionCounterRepository, InMemoryShortUrlRepository, InMemoryWorkerStateRepository,
};
use range_shortener::utils::retry::RetryPolicy;

pub type MemoryKeyService =
    KeyService<InMemoryWorkerStateRepository, InMemoryPartitionCounterRepository>;
pub type MemoryShortUrlService = ShortUrlService<
    InMemoryShortUrlRepository,
    InMemoryWorkerStateRepository,
    InMemoryPartitionCounterRepository,
>;

pub const RANGE_SIZE: i64 = 20_000_000;

/// Shared in-process stores, standing in for the database several workers
/// talk to.
#[derive(Clone, Default)]
pub struct MemoryStores {
    pub counter: Arc<InMemoryPartitionCounterRepository>,
    pub worker_states: Arc<InMemoryWorkerStateRepository>,
    pub short_urls: Arc<InMemoryShortUrlRepository>,
}

impl MemoryStores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_counter_at(last_allocated: i64) -> Self {
        Self {
            counter: Arc::new(InMemoryPartitionCounterRepository::starting_at(
                last_allocated,
            )),
            ..Self::default()
        }
    }

    pub fn partition_service(
        &self,
        max_partition: i64,
    ) -> Arc<PartitionService<InMemoryPartitionCounterRepository>> {
        Arc::new(PartitionService::new(self.counter.clone(), max_partition))
    }

    /// A key service as one worker process would build it.
    pub fn key_service(&self, range_size: i64, max_partition: i64) -> Arc<MemoryKeyService> {
        Arc::new(KeyService::new(
            self.worker_states.clone(),
            self.partition_service(max_partition),
            range_size,
        ))
    }

    pub fn short_url_service(&self, worker_id: &str) -> MemoryShortUrlService {
        ShortUrlService::new(
            self.short_urls.clone(),
            self.key_service(RANGE_SIZE, i64::MAX / RANGE_SIZE),
            Arc::new(NullCache::new()),
            worker_id,
            RetryPolicy::on_duplicate_key(3).unwrap(),
            Duration::days(365),
        )
    }
}
