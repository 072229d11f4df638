//! Global partition allocation.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::repositories::PartitionCounterRepository;
use crate::error::AppError;

/// Hands out globally unique, strictly increasing partition numbers.
///
/// Every call is one atomic increment-and-fetch on the shared counter, so
/// concurrent callers in any number of processes never receive the same
/// partition.
pub struct PartitionService<C: PartitionCounterRepository + ?Sized> {
    counter: Arc<C>,
    max_partition: i64,
}

impl<C: PartitionCounterRepository + ?Sized> PartitionService<C> {
    /// Creates a new partition service.
    ///
    /// Partitions above `max_partition` are refused with
    /// [`AppError::KeyOverflow`].
    pub fn new(counter: Arc<C>, max_partition: i64) -> Self {
        Self {
            counter,
            max_partition,
        }
    }

    pub fn max_partition(&self) -> i64 {
        self.max_partition
    }

    /// Allocates the next partition number.
    ///
    /// The first allocation on an empty store returns 1.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::KeyOverflow`] when the partition space is
    /// exhausted, [`AppError::StorageUnavailable`] if the store fails.
    pub async fn allocate_range_partition(&self) -> Result<i64, AppError> {
        let partition = self.counter.increment_and_fetch().await?;

        if partition < 1 {
            return Err(AppError::storage_unavailable(
                format!("partition counter returned non-positive value {partition}"),
                None,
            ));
        }

        if partition > self.max_partition {
            // The increment has already happened; the number is burned.
            warn!(
                partition,
                max_partition = self.max_partition,
                "Partition space exhausted"
            );
            return Err(AppError::key_overflow(format!(
                "partition {} exceeds maximum {}",
                partition, self.max_partition
            )));
        }

        metrics::counter!("partitions_allocated_total").increment(1);
        info!(partition, "Allocated range partition");

        Ok(partition)
    }

    /// Returns the last allocated partition number (0 if none).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`] if the store fails.
    pub async fn last_allocated_partition(&self) -> Result<i64, AppError> {
        self.counter.current().await
    }
}
