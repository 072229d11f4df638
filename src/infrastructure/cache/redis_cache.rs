//! Redis-backed cache implementation.

use super::service::CacheService;
use crate::error::AppError;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info, warn};

/// Redis cache of resolved codes.
///
/// Shares connections through a `ConnectionManager`. Errors are logged and
/// never propagated to callers.
pub struct RedisCache {
    conn: ConnectionManager,
    default_ttl: u64,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// `default_ttl_seconds` (`CACHE_TTL_SECONDS`) is the longest an entry is
    /// kept.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`] if the URL is invalid, the
    /// connection cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> Result<Self, AppError> {
        let conn = connect_manager(redis_url).await?;

        Ok(Self {
            conn,
            default_ttl: default_ttl_seconds,
            key_prefix: "code:".to_string(),
        })
    }

    fn build_key(&self, code: &str) -> String {
        format!("{}{}", self.key_prefix, code)
    }
}

/// Opens a PING-checked connection manager.
///
/// Shared by the cache and the Redis partition counter.
///
/// # Errors
///
/// Returns [`AppError::StorageUnavailable`] on any connection failure.
pub(crate) async fn connect_manager(redis_url: &str) -> Result<ConnectionManager, AppError> {
    info!(
        "Connecting to Redis at {}",
        crate::config::mask_connection_string(redis_url)
    );

    let client = Client::open(redis_url)?;
    let manager = ConnectionManager::new(client).await?;

    let mut test_conn = manager.clone();
    test_conn.ping::<()>().await?;

    info!("✓ Connected to Redis");
    Ok(manager)
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_url(&self, code: &str) -> Option<String> {
        let key = self.build_key(code);
        let mut conn = self.conn.clone();

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(url)) => {
                debug!(code, "Cache HIT");
                Some(url)
            }
            Ok(None) => {
                debug!(code, "Cache MISS");
                None
            }
            Err(e) => {
                warn!(code, error = %e, "Redis GET failed");
                None
            }
        }
    }

    async fn set_url(&self, code: &str, long_url: &str, ttl_seconds: Option<u64>) {
        let ttl = ttl_seconds.map_or(self.default_ttl, |ttl| ttl.min(self.default_ttl));
        if ttl == 0 {
            return;
        }

        let key = self.build_key(code);
        let mut conn = self.conn.clone();

        match conn.set_ex::<_, _, ()>(&key, long_url, ttl).await {
            Ok(()) => debug!(code, ttl, "Cache SET"),
            Err(e) => warn!(code, error = %e, "Redis SET failed"),
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.conn.clone();
        conn.ping::<()>().await.is_ok()
    }
}
