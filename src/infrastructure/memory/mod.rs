//! In-process store implementations.
//!
//! They honor the same contracts as the PostgreSQL and Redis repositories
//! (atomic increment, optimistic worker-state writes, unique codes) within a
//! single process. Used by integration tests and single-node setups.

mod partition_counter;
mod short_url;
mod worker_state;

pub use partition_counter::InMemoryPartitionCounterRepository;
pub use short_url::InMemoryShortUrlRepository;
pub use worker_state::InMemoryWorkerStateRepository;
