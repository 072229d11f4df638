//! Error types shared by the allocator, the encoder and the service layer.
//!
//! Every failure carries an [`ErrorKind`] so that callers (and the retry
//! wrapper in [`crate::utils::retry`]) can tell permanent failures from
//! transient ones without string matching.

use std::error::Error as StdError;
use thiserror::Error;

/// Boxed cause attached to storage-level failures.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Coarse classification of an [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid configuration, e.g. a retry policy without retryable kinds.
    Configuration,
    /// The partition space or global key space is exhausted.
    KeyOverflow,
    /// The backing store could not complete an operation.
    StorageUnavailable,
    /// A write collided with an existing record.
    DuplicateKeyConflict,
    /// Malformed input (URL, short code).
    Validation,
    /// The requested record does not exist or has expired.
    NotFound,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("key overflow: {message}")]
    KeyOverflow { message: String },

    #[error("storage unavailable: {message}")]
    StorageUnavailable {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("duplicate key conflict: {message}")]
    DuplicateKeyConflict {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },
}

impl AppError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn key_overflow(message: impl Into<String>) -> Self {
        Self::KeyOverflow {
            message: message.into(),
        }
    }

    pub fn storage_unavailable(message: impl Into<String>, source: Option<BoxError>) -> Self {
        Self::StorageUnavailable {
            message: message.into(),
            source,
        }
    }

    pub fn conflict(message: impl Into<String>, source: Option<BoxError>) -> Self {
        Self::DuplicateKeyConflict {
            message: message.into(),
            source,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Returns the kind of this error, ignoring any attached cause.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Configuration { .. } => ErrorKind::Configuration,
            AppError::KeyOverflow { .. } => ErrorKind::KeyOverflow,
            AppError::StorageUnavailable { .. } => ErrorKind::StorageUnavailable,
            AppError::DuplicateKeyConflict { .. } => ErrorKind::DuplicateKeyConflict,
            AppError::Validation { .. } => ErrorKind::Validation,
            AppError::NotFound { .. } => ErrorKind::NotFound,
        }
    }
}

/// Postgres SQLSTATE for `numeric_value_out_of_range`.
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Classifies a SQLx error into an [`AppError`].
///
/// - unique violations become [`AppError::DuplicateKeyConflict`]
/// - `BIGINT` overflow on a counter becomes [`AppError::KeyOverflow`]
/// - everything else is [`AppError::StorageUnavailable`]
pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            let message = match db.constraint() {
                Some(constraint) => format!("unique constraint `{constraint}` violated"),
                None => "unique constraint violated".to_string(),
            };
            return AppError::conflict(message, Some(Box::new(e)));
        }

        if db.code().as_deref() == Some(NUMERIC_VALUE_OUT_OF_RANGE) {
            return AppError::key_overflow(format!("counter out of range: {}", db.message()));
        }
    }

    AppError::storage_unavailable("database operation failed", Some(Box::new(e)))
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}

impl From<redis::RedisError> for AppError {
    fn from(e: redis::RedisError) -> Self {
        // INCR past i64::MAX is rejected by the server rather than wrapped.
        if e.to_string().contains("would overflow") {
            return AppError::key_overflow(format!("redis counter overflow: {e}"));
        }

        AppError::storage_unavailable("redis operation failed", Some(Box::new(e)))
    }
}
