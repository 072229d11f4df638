//! Repository trait for short URL mappings.

use crate::domain::entities::{NewShortUrl, ShortUrl};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for code to long URL mappings.
///
/// # Examples
///
/// See integration tests: `tests/repository_short_url.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortUrlRepository: Send + Sync {
    /// Creates a new mapping.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DuplicateKeyConflict`] if the code already exists.
    /// Returns [`AppError::StorageUnavailable`] on store errors.
    async fn create(&self, new_short_url: NewShortUrl) -> Result<ShortUrl, AppError>;

    /// Finds a mapping by its code, expired or not.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`] on store errors.
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortUrl>, AppError>;

    /// Finds the most recently created mapping for a long URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`] on store errors.
    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<ShortUrl>, AppError>;

    /// Stamps the last access time of a mapping.
    ///
    /// Returns `Ok(false)` if no mapping has this code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`] on store errors.
    async fn record_access(&self, code: &str, at: DateTime<Utc>) -> Result<bool, AppError>;
}
