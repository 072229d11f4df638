use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::entities::{NewShortUrl, ShortUrl};
use crate::domain::repositories::ShortUrlRepository;
use crate::error::AppError;

#[derive(Debug, Default)]
struct Table {
    next_id: i64,
    by_code: HashMap<String, ShortUrl>,
}

/// Short URL mappings keyed by code.
#[derive(Debug, Default)]
pub struct InMemoryShortUrlRepository {
    table: RwLock<Table>,
}

impl InMemoryShortUrlRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored mappings.
    pub async fn len(&self) -> usize {
        self.table.read().await.by_code.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ShortUrlRepository for InMemoryShortUrlRepository {
    async fn create(&self, new_short_url: NewShortUrl) -> Result<ShortUrl, AppError> {
        let mut table = self.table.write().await;

        if table.by_code.contains_key(&new_short_url.code) {
            return Err(AppError::conflict(
                format!("code '{}' already exists", new_short_url.code),
                None,
            ));
        }

        table.next_id += 1;
        let short_url = ShortUrl {
            id: table.next_id,
            code: new_short_url.code,
            long_url: new_short_url.long_url,
            created_at: Utc::now(),
            expires_at: new_short_url.expires_at,
            last_access_at: None,
        };
        table
            .by_code
            .insert(short_url.code.clone(), short_url.clone());

        Ok(short_url)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortUrl>, AppError> {
        Ok(self.table.read().await.by_code.get(code).cloned())
    }

    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<ShortUrl>, AppError> {
        Ok(self
            .table
            .read()
            .await
            .by_code
            .values()
            .filter(|short_url| short_url.long_url == long_url)
            .max_by_key(|short_url| (short_url.created_at, short_url.id))
            .cloned())
    }

    async fn record_access(&self, code: &str, at: DateTime<Utc>) -> Result<bool, AppError> {
        let mut table = self.table.write().await;
        Ok(match table.by_code.get_mut(code) {
            Some(short_url) => {
                short_url.last_access_at = Some(at);
                true
            }
            None => false,
        })
    }
}
