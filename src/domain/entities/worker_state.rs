//! Per-worker range history and the arithmetic that turns a range cursor
//! into a global key.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A worker's lease on one partition of the global key space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatedRange {
    pub partition_number: i64,
    /// Last counter value issued from this range; 0 when nothing was issued yet.
    pub counter: i64,
    pub exhausted: bool,
}

impl AllocatedRange {
    /// Creates a fresh, unused range for `partition_number`.
    pub fn new(partition_number: i64) -> Self {
        Self {
            partition_number,
            counter: 0,
            exhausted: false,
        }
    }

    /// Returns true once the range can no longer issue keys.
    ///
    /// A range that was never flagged but whose counter already sits at the
    /// last issuable value (e.g. after `RANGE_SIZE` was lowered) is spent too.
    pub fn is_spent(&self, range_size: i64) -> bool {
        self.exhausted || self.counter >= last_counter(range_size)
    }

    /// Advances the cursor and returns the global key for the new counter.
    ///
    /// Issuing the last valid counter flags the range as exhausted in the same
    /// step.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::KeyOverflow`] if the range is already spent or the
    /// resulting key does not fit the key space.
    pub fn issue_next(&mut self, range_size: i64) -> Result<u64, AppError> {
        if self.is_spent(range_size) {
            return Err(AppError::key_overflow(format!(
                "range for partition {} is exhausted",
                self.partition_number
            )));
        }

        let counter = self.counter + 1;
        let key = global_key(self.partition_number, counter, range_size)?;

        self.counter = counter;
        if counter >= last_counter(range_size) {
            self.exhausted = true;
        }

        Ok(key)
    }
}

/// Highest counter value a range of `range_size` may issue.
pub fn last_counter(range_size: i64) -> i64 {
    range_size - 1
}

/// Computes `(partition_number - 1) * range_size + counter`.
///
/// # Errors
///
/// Returns [`AppError::KeyOverflow`] if the partition is not positive or the
/// key does not fit in a signed 64-bit integer.
pub fn global_key(partition_number: i64, counter: i64, range_size: i64) -> Result<u64, AppError> {
    if partition_number < 1 {
        return Err(AppError::key_overflow(format!(
            "partition number {partition_number} is out of range"
        )));
    }

    (partition_number - 1)
        .checked_mul(range_size)
        .and_then(|base| base.checked_add(counter))
        .and_then(|key| u64::try_from(key).ok())
        .ok_or_else(|| {
            AppError::key_overflow(format!(
                "key for partition {partition_number}, counter {counter} exceeds the key space"
            ))
        })
}

/// The allocation history of one worker identity.
///
/// Ranges are append-only and never removed. `version` is the optimistic
/// concurrency token of the stored record; 0 means the state was never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerState {
    pub worker_id: String,
    pub allocated_ranges: Vec<AllocatedRange>,
    pub version: i64,
}

impl WorkerState {
    /// Creates an empty, unpersisted state for `worker_id`.
    pub fn new(worker_id: impl Into<String>) -> Self {
        Self {
            worker_id: worker_id.into(),
            allocated_ranges: Vec::new(),
            version: 0,
        }
    }

    /// Index of the range keys are currently issued from, if any.
    pub fn active_range_index(&self, range_size: i64) -> Option<usize> {
        self.allocated_ranges
            .iter()
            .rposition(|range| !range.is_spent(range_size))
    }

    /// Flags every spent-but-unflagged range as exhausted.
    ///
    /// Returns the number of ranges that changed.
    pub fn retire_spent_ranges(&mut self, range_size: i64) -> usize {
        let mut retired = 0;
        for range in &mut self.allocated_ranges {
            if !range.exhausted && range.is_spent(range_size) {
                range.exhausted = true;
                retired += 1;
            }
        }
        retired
    }

    /// Appends a fresh range and returns its index.
    pub fn push_range(&mut self, partition_number: i64) -> usize {
        self.allocated_ranges
            .push(AllocatedRange::new(partition_number));
        self.allocated_ranges.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const RANGE_SIZE: i64 = 20_000_000;

    #[test]
    fn test_first_key_of_first_partition_is_one() {
        let mut range = AllocatedRange::new(1);
        assert_eq!(range.issue_next(RANGE_SIZE).unwrap(), 1);
        assert_eq!(range.counter, 1);
        assert!(!range.exhausted);
    }

    #[test]
    fn test_partitions_are_disjoint() {
        let mut second = AllocatedRange::new(2);
        assert_eq!(second.issue_next(RANGE_SIZE).unwrap(), 20_000_001);
    }

    #[test]
    fn test_last_issue_flags_exhaustion() {
        let mut range = AllocatedRange {
            partition_number: 1,
            counter: 19_999_998,
            exhausted: false,
        };

        let key = range.issue_next(RANGE_SIZE).unwrap();

        assert_eq!(key, 19_999_999);
        assert!(range.exhausted);
        assert!(range.issue_next(RANGE_SIZE).is_err());
    }

    #[test]
    fn test_small_range_walk() {
        let mut range = AllocatedRange::new(3);
        let keys: Vec<u64> = (0..3).map(|_| range.issue_next(4).unwrap()).collect();

        assert_eq!(keys, vec![9, 10, 11]);
        assert!(range.exhausted);
    }

    #[test]
    fn test_global_key_overflow() {
        let err = global_key(i64::MAX, 1, RANGE_SIZE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyOverflow);

        let err = global_key(0, 1, RANGE_SIZE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyOverflow);
    }

    #[test]
    fn test_active_range_is_last_unspent() {
        let mut state = WorkerState::new("33cc6eebd387");
        assert_eq!(state.active_range_index(RANGE_SIZE), None);

        state.allocated_ranges.push(AllocatedRange {
            partition_number: 1,
            counter: 19_999_999,
            exhausted: true,
        });
        assert_eq!(state.active_range_index(RANGE_SIZE), None);

        let index = state.push_range(4);
        assert_eq!(index, 1);
        assert_eq!(state.active_range_index(RANGE_SIZE), Some(1));
    }

    #[test]
    fn test_retire_spent_ranges() {
        let mut state = WorkerState::new("worker");
        state.allocated_ranges.push(AllocatedRange {
            partition_number: 1,
            counter: 99,
            exhausted: false,
        });

        assert_eq!(state.retire_spent_ranges(100), 1);
        assert!(state.allocated_ranges[0].exhausted);
        assert_eq!(state.retire_spent_ranges(100), 0);
    }
}
