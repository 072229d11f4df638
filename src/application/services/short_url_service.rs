//! Short URL creation and resolution on top of the key allocator.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info};
use url::Url;

use super::key_service::KeyService;
use crate::domain::entities::{NewShortUrl, ShortUrl};
use crate::domain::repositories::{
    PartitionCounterRepository, ShortUrlRepository, WorkerStateRepository,
};
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::key_encoder;
use crate::utils::retry::RetryPolicy;

/// Service for shortening and resolving URLs.
///
/// New codes are derived from keys issued to this process's worker identity.
/// The whole derive-encode-persist sequence runs under the retry policy, so a
/// rare code collision is resolved by deriving a fresh key.
pub struct ShortUrlService<S, W, C>
where
    S: ShortUrlRepository + ?Sized,
    W: WorkerStateRepository + ?Sized,
    C: PartitionCounterRepository + ?Sized,
{
    short_urls: Arc<S>,
    keys: Arc<KeyService<W, C>>,
    cache: Arc<dyn CacheService>,
    worker_id: String,
    retry_policy: RetryPolicy,
    link_ttl: Duration,
}

impl<S, W, C> ShortUrlService<S, W, C>
where
    S: ShortUrlRepository + ?Sized,
    W: WorkerStateRepository + ?Sized,
    C: PartitionCounterRepository + ?Sized,
{
    /// Creates a new short URL service.
    pub fn new(
        short_urls: Arc<S>,
        keys: Arc<KeyService<W, C>>,
        cache: Arc<dyn CacheService>,
        worker_id: impl Into<String>,
        retry_policy: RetryPolicy,
        link_ttl: Duration,
    ) -> Self {
        Self {
            short_urls,
            keys,
            cache,
            worker_id: worker_id.into(),
            retry_policy,
            link_ttl,
        }
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Shortens `long_url`.
    ///
    /// # Deduplication
    ///
    /// If a non-expired mapping for the same URL exists, it is returned
    /// without consuming a key.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the URL is not an absolute http(s) URL
    /// - [`AppError::KeyOverflow`] if the key space is exhausted
    /// - [`AppError::DuplicateKeyConflict`] if every retry collided
    /// - [`AppError::StorageUnavailable`] on store errors
    pub async fn shorten(&self, long_url: &str) -> Result<ShortUrl, AppError> {
        let long_url = validate_long_url(long_url)?;

        if let Some(existing) = self
            .short_urls
            .find_by_long_url(&long_url)
            .await?
            .filter(|existing| !existing.is_expired())
        {
            debug!(code = %existing.code, "Reusing existing short url");
            return Ok(existing);
        }

        let keys = &self.keys;
        let short_urls = &self.short_urls;
        let worker_id = self.worker_id.as_str();
        let long_url = long_url.as_str();
        let expires_at = Some(Utc::now() + self.link_ttl);

        let created = self
            .retry_policy
            .run(move || async move {
                let key = keys.get_new_key(worker_id).await?;
                let code = key_encoder::encode(key, long_url);

                short_urls
                    .create(NewShortUrl {
                        code,
                        long_url: long_url.to_string(),
                        expires_at,
                    })
                    .await
            })
            .await?;

        metrics::counter!("short_urls_created_total").increment(1);
        info!(code = %created.code, worker_id, "Created short url");

        self.cache_mapping(&created).await;
        Ok(created)
    }

    /// Resolves `code` to its long URL and records the access.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the code is empty
    /// - [`AppError::NotFound`] if the code is unknown or expired
    /// - [`AppError::StorageUnavailable`] on store errors
    pub async fn resolve(&self, code: &str) -> Result<String, AppError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AppError::validation("short code must not be empty"));
        }

        let now = Utc::now();

        if let Some(long_url) = self.cache.get_url(code).await {
            self.short_urls.record_access(code, now).await?;
            return Ok(long_url);
        }

        let short_url = self
            .short_urls
            .find_by_code(code)
            .await?
            .filter(|short_url| !short_url.is_expired_at(now))
            .ok_or_else(|| AppError::not_found(format!("short code '{code}' not found")))?;

        self.short_urls.record_access(code, now).await?;
        self.cache_mapping(&short_url).await;

        Ok(short_url.long_url)
    }

    /// Recovers the global key a code was derived from.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the code was not produced by the
    /// key encoder.
    pub fn decode_key(&self, code: &str) -> Result<u64, AppError> {
        key_encoder::decode_key(code)
    }

    async fn cache_mapping(&self, short_url: &ShortUrl) {
        let ttl = short_url
            .remaining_ttl_seconds(Utc::now())
            .map(|seconds| u64::try_from(seconds).unwrap_or(0));

        if ttl == Some(0) {
            return;
        }

        self.cache
            .set_url(&short_url.code, &short_url.long_url, ttl)
            .await;
    }
}

/// Checks that `long_url` is an absolute http(s) URL and returns its
/// serialized form.
fn validate_long_url(long_url: &str) -> Result<String, AppError> {
    let parsed = Url::parse(long_url.trim())
        .map_err(|e| AppError::validation(format!("invalid URL '{long_url}': {e}")))?;

    match parsed.scheme() {
        "http" | "https" if parsed.has_host() => Ok(parsed.to_string()),
        _ => Err(AppError::validation(format!(
            "URL '{long_url}' must be an absolute http or https URL"
        ))),
    }
}
