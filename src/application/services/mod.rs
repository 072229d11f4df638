//! Business logic services for the application layer.

pub mod key_service;
pub mod partition_service;
pub mod short_url_service;

pub use key_service::KeyService;
pub use partition_service::PartitionService;
pub use short_url_service::ShortUrlService;
