use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use revu_core::RepoError;
use revu_core::domain::{RateLimitEntry, RateLimitKey};
use revu_core::ports::RateLimitStore;

/// Rate-limit ledger kept in a HashMap behind an async RwLock.
///
/// Each conditional write holds the write lock for its whole
/// compare-and-set, which gives the same guarantee as a conditional
/// `UPDATE`. Note: data is lost on process restart.
#[derive(Default)]
pub struct InMemoryRateLimitStore {
    entries: RwLock<HashMap<RateLimitKey, RateLimitEntry>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn get_by_key(&self, key: &RateLimitKey) -> Result<Option<RateLimitEntry>, RepoError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn insert_if_absent(&self, entry: &RateLimitEntry) -> Result<bool, RepoError> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(&entry.key) {
            return Ok(false);
        }
        entries.insert(entry.key.clone(), entry.clone());
        Ok(true)
    }

    async fn upsert_count(
        &self,
        expected: &RateLimitEntry,
        action_count: u32,
        last_action_at: DateTime<Utc>,
    ) -> Result<bool, RepoError> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(&expected.key) {
            Some(stored) if stored == expected => {
                stored.action_count = action_count;
                stored.last_action_at = last_action_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
