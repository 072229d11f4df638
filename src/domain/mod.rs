//! Domain layer containing business entities and store contracts.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Store trait definitions
//!
//! The domain layer has no dependencies on infrastructure. Repository traits
//! define the guarantees the allocator relies on (atomic increment-and-fetch,
//! optimistic worker-state writes); implementations live in
//! [`crate::infrastructure`].

pub mod entities;
pub mod repositories;
