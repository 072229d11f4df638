//! Shared-store repository implementations.
//!
//! SQLx-backed PostgreSQL repositories for every record, plus a Redis
//! alternative for the partition counter.
//!
//! # Repositories
//!
//! - [`PgPartitionCounterRepository`] - Counter row updated by a single upsert
//! - [`RedisPartitionCounterRepository`] - Counter key updated by `INCR`
//! - [`PgWorkerStateRepository`] - Worker range history with version checks
//! - [`PgShortUrlRepository`] - Code to long URL mappings

pub mod pg_partition_counter_repository;
pub mod pg_short_url_repository;
pub mod pg_worker_state_repository;
pub mod redis_partition_counter_repository;

pub use pg_partition_counter_repository::PgPartitionCounterRepository;
pub use pg_short_url_repository::PgShortUrlRepository;
pub use pg_worker_state_repository::PgWorkerStateRepository;
pub use redis_partition_counter_repository::RedisPartitionCounterRepository;
