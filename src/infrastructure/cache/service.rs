//! Cache service trait.

use async_trait::async_trait;

/// Cache of resolved short codes.
///
/// Implementations are fail-open: a backend error is logged and reported as a
/// miss (or silently skipped on writes), so the store stays the source of
/// truth and a cache outage never fails a request.
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Returns the cached long URL for `code`, `None` on miss or error.
    async fn get_url(&self, code: &str) -> Option<String>;

    /// Caches `long_url` under `code`.
    ///
    /// The entry lives for the implementation default TTL, shortened to
    /// `ttl_seconds` when given (the mapping's remaining lifetime).
    async fn set_url(&self, code: &str, long_url: &str, ttl_seconds: Option<u64>);

    /// Checks if the cache backend is reachable.
    async fn health_check(&self) -> bool;
}
