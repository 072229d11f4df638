//! Repository trait definitions for the domain layer.
//!
//! These traits abstract the shared store. Implementations live in
//! `crate::infrastructure::persistence` (PostgreSQL, Redis) and
//! `crate::infrastructure::memory` (in-process). Mock implementations are
//! generated via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`PartitionCounterRepository`] - The global partition counter
//! - [`WorkerStateRepository`] - Per-worker range history
//! - [`ShortUrlRepository`] - Code to long URL mappings

pub mod partition_counter_repository;
pub mod short_url_repository;
pub mod worker_state_repository;

pub use partition_counter_repository::PartitionCounterRepository;
pub use short_url_repository::ShortUrlRepository;
pub use worker_state_repository::WorkerStateRepository;

#[cfg(test)]
pub use partition_counter_repository::MockPartitionCounterRepository;
#[cfg(test)]
pub use short_url_repository::MockShortUrlRepository;
#[cfg(test)]
pub use worker_state_repository::MockWorkerStateRepository;
