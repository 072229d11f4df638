//! Application layer services implementing business logic.
//!
//! Services coordinate repository calls and domain rules. They depend only on
//! the repository traits, so the same logic runs against PostgreSQL, Redis or
//! the in-memory stores.
//!
//! # Available Services
//!
//! - [`services::partition_service::PartitionService`] - Global partition allocation
//! - [`services::key_service::KeyService`] - Per-worker range bookkeeping and key issuance
//! - [`services::short_url_service::ShortUrlService`] - Short code creation and resolution

pub mod services;
