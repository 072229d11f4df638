use async_trait::async_trait;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::repositories::PartitionCounterRepository;
use crate::error::AppError;

/// Partition counter backed by an atomic integer.
#[derive(Debug, Default)]
pub struct InMemoryPartitionCounterRepository {
    last_allocated: AtomicI64,
}

impl InMemoryPartitionCounterRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the counter at `last_allocated`; the next allocation returns
    /// `last_allocated + 1`.
    pub fn starting_at(last_allocated: i64) -> Self {
        Self {
            last_allocated: AtomicI64::new(last_allocated),
        }
    }
}

#[async_trait]
impl PartitionCounterRepository for InMemoryPartitionCounterRepository {
    async fn increment_and_fetch(&self) -> Result<i64, AppError> {
        self.last_allocated
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                current.checked_add(1)
            })
            .map(|previous| previous + 1)
            .map_err(|current| {
                AppError::key_overflow(format!("partition counter stuck at {current}"))
            })
    }

    async fn current(&self) -> Result<i64, AppError> {
        Ok(self.last_allocated.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn test_starts_at_one() {
        let counter = InMemoryPartitionCounterRepository::new();
        assert_eq!(counter.increment_and_fetch().await.unwrap(), 1);
        assert_eq!(counter.increment_and_fetch().await.unwrap(), 2);
        assert_eq!(counter.current().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_overflow_does_not_wrap() {
        let counter = InMemoryPartitionCounterRepository::starting_at(i64::MAX);

        let err = counter.increment_and_fetch().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::KeyOverflow);
        assert_eq!(counter.current().await.unwrap(), i64::MAX);
    }
}
