//! Infrastructure layer for external integrations.
//!
//! Concrete implementations of the domain repository traits plus caching.
//!
//! # Modules
//!
//! - [`cache`] - Caching abstractions (Redis and no-op implementations)
//! - [`persistence`] - PostgreSQL and Redis repository implementations
//! - [`memory`] - In-process repository implementations

pub mod cache;
pub mod memory;
pub mod persistence;
