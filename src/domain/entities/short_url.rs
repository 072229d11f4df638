//! Short URL entity representing a code to long URL mapping.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A persisted short URL with its lifetime metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ShortUrl {
    pub id: i64,
    pub code: String,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_access_at: Option<DateTime<Utc>>,
}

impl ShortUrl {
    /// Returns true if the mapping has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now >= e)
    }

    /// Seconds until expiry, or `None` for mappings without an expiry.
    pub fn remaining_ttl_seconds(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expires_at.map(|e| (e - now).num_seconds().max(0))
    }
}

/// Input data for creating a new short URL.
#[derive(Debug, Clone)]
pub struct NewShortUrl {
    pub code: String,
    pub long_url: String,
    pub expires_at: Option<DateTime<Utc>>,
}
