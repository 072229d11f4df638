//! Process-wide wiring of stores and services.
//!
//! [`AppState::from_config`] is the single bootstrap path: it connects the
//! PostgreSQL pool, applies migrations, selects the partition counter backend
//! and cache, and builds the services on top of them.

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;

use crate::application::services::{KeyService, PartitionService, ShortUrlService};
use crate::config::{CounterBackend, Config};
use crate::domain::repositories::PartitionCounterRepository;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::persistence::pg_partition_counter_repository::RANGE_PARTITION_COUNTER;
use crate::infrastructure::persistence::{
    PgPartitionCounterRepository, PgShortUrlRepository, PgWorkerStateRepository,
    RedisPartitionCounterRepository,
};
use crate::utils::retry::RetryPolicy;
use crate::utils::worker_id::resolve_worker_id;

pub type DynPartitionCounter = dyn PartitionCounterRepository;

pub type AppPartitionService = PartitionService<DynPartitionCounter>;
pub type AppKeyService = KeyService<PgWorkerStateRepository, DynPartitionCounter>;
pub type AppShortUrlService =
    ShortUrlService<PgShortUrlRepository, PgWorkerStateRepository, DynPartitionCounter>;

/// Shared handles for one worker process.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<PgPool>,
    pub cache: Arc<dyn CacheService>,
    pub worker_id: String,
    pub partitions: Arc<AppPartitionService>,
    pub keys: Arc<AppKeyService>,
    pub short_urls: Arc<AppShortUrlService>,
}

impl AppState {
    /// Builds the full application state from configuration.
    ///
    /// Initializes:
    /// - PostgreSQL connection pool
    /// - Apply migrations
    /// - Partition counter (PostgreSQL row or Redis key)
    /// - Redis cache (or NullCache fallback)
    /// - Worker identity
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Database connection or migration fails
    /// - The Redis counter backend is selected but Redis is unreachable
    /// - No worker identity can be resolved
    pub async fn from_config(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
            .idle_timeout(Duration::from_secs(config.db_idle_timeout))
            .max_lifetime(Duration::from_secs(config.db_max_lifetime))
            .connect(&config.database_url)
            .await
            .context("Failed to connect to database")?;
        tracing::info!("Connected to database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to apply migrations")?;

        let pool = Arc::new(pool);

        let counter: Arc<DynPartitionCounter> = match config.counter_backend {
            CounterBackend::Postgres => {
                tracing::info!("Partition counter: PostgreSQL");
                Arc::new(PgPartitionCounterRepository::new(pool.clone()))
            }
            CounterBackend::Redis => {
                let redis_url = config
                    .redis_url
                    .as_deref()
                    .context("PARTITION_COUNTER_BACKEND=redis requires REDIS_URL")?;
                tracing::info!("Partition counter: Redis");
                Arc::new(
                    RedisPartitionCounterRepository::connect(redis_url, RANGE_PARTITION_COUNTER)
                        .await?,
                )
            }
        };

        let cache: Arc<dyn CacheService> = if let Some(redis_url) = &config.redis_url {
            match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
                Ok(redis) => {
                    tracing::info!("Cache enabled (Redis)");
                    Arc::new(redis)
                }
                Err(e) => {
                    tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                    Arc::new(NullCache::new())
                }
            }
        } else {
            tracing::info!("Cache disabled (NullCache)");
            Arc::new(NullCache::new())
        };

        let worker_id = resolve_worker_id(config.worker_id.as_deref())?;
        tracing::info!(worker_id = %worker_id, "Resolved worker identity");

        let retry_policy = RetryPolicy::on_duplicate_key(config.shorten_max_retries)?
            .with_delay(Duration::from_millis(config.retry_delay_ms));

        let partitions = Arc::new(PartitionService::new(counter, config.max_partition));
        let keys = Arc::new(KeyService::new(
            Arc::new(PgWorkerStateRepository::new(pool.clone())),
            partitions.clone(),
            config.range_size,
        ));
        let short_urls = Arc::new(ShortUrlService::new(
            Arc::new(PgShortUrlRepository::new(pool.clone())),
            keys.clone(),
            cache.clone(),
            worker_id.clone(),
            retry_policy,
            chrono::Duration::seconds(config.link_ttl_seconds),
        ));

        Ok(Self {
            db: pool,
            cache,
            worker_id,
            partitions,
            keys,
            short_urls,
        })
    }

    /// Pings the database and cache.
    ///
    /// Returns `(database_ok, cache_ok)`.
    pub async fn health(&self) -> (bool, bool) {
        let database_ok = sqlx::query("SELECT 1")
            .execute(self.db.as_ref())
            .await
            .is_ok();
        let cache_ok = self.cache.health_check().await;

        (database_ok, cache_ok)
    }
}
