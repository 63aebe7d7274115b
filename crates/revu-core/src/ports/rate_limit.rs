//! Rate-limit ledger port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{RateLimitEntry, RateLimitKey};
use crate::error::RepoError;

/// Storage for the per-device action ledger.
///
/// Writes are conditional so that concurrent checks against the same key
/// cannot both consume the last unit of quota.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Fetch the entry for the exact key tuple (`qr_code_id` compared as given).
    async fn get_by_key(&self, key: &RateLimitKey) -> Result<Option<RateLimitEntry>, RepoError>;

    /// Insert the first entry for a key. Returns `false` if one already exists.
    async fn insert_if_absent(&self, entry: &RateLimitEntry) -> Result<bool, RepoError>;

    /// Set `action_count` and `last_action_at`, but only while the stored row
    /// still equals `expected`. Returns `false` when it no longer does.
    async fn upsert_count(
        &self,
        expected: &RateLimitEntry,
        action_count: u32,
        last_action_at: DateTime<Utc>,
    ) -> Result<bool, RepoError>;
}
