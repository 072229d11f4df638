//! Helpers used across the allocator and the service layer.
//!
//! - [`base58`] - Base58 encoding of global keys
//! - [`key_encoder`] - Global key + URL to short code
//! - [`retry`] - Explicit retry wrapper for racy writes
//! - [`worker_id`] - Worker identity resolution

pub mod base58;
pub mod key_encoder;
pub mod retry;
pub mod worker_id;
