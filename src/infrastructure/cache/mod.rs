//! Read-through cache for code to long URL lookups.
//!
//! Provides a [`CacheService`] trait with two implementations:
//! - [`RedisCache`] - Redis-backed cache
//! - [`NullCache`] - No-op implementation when Redis is not configured

mod null_cache;
mod redis_cache;
mod service;

pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub(crate) use redis_cache::connect_manager;
pub use service::CacheService;
