//! Core domain entities.
//!
//! - [`WorkerState`] / [`AllocatedRange`] - A worker's partition leases and cursors
//! - [`ShortUrl`] - A persisted code to long URL mapping
//!
//! Entities follow the "New Type" pattern with separate structs for creation
//! where the store assigns fields (`NewShortUrl`).

pub mod short_url;
pub mod worker_state;

pub use short_url::{NewShortUrl, ShortUrl};
pub use worker_state::{AllocatedRange, WorkerState, global_key, last_counter};
