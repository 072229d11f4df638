//! No-op cache implementation for disabled caching.

use super::service::CacheService;
use async_trait::async_trait;
use tracing::debug;

/// A cache that stores nothing; every lookup is a miss.
///
/// Used when Redis is not configured or unreachable at startup, and in tests.
pub struct NullCache;

impl NullCache {
    /// Creates a new NullCache instance.
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get_url(&self, _code: &str) -> Option<String> {
        None
    }

    async fn set_url(&self, _code: &str, _long_url: &str, _ttl_seconds: Option<u64>) {}

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_cache_always_misses() {
        let cache = NullCache::new();
        cache.set_url("2a1", "https://example.com", Some(60)).await;

        assert_eq!(cache.get_url("2a1").await, None);
        assert!(cache.health_check().await);
    }
}
