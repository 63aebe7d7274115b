//! Device-scoped rate limiting.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};

use crate::domain::{RateLimitDecision, RateLimitEntry, RateLimitKey};
use crate::error::{DomainError, RepoError};
use crate::ports::{Clock, RateLimitStore};

/// Attempts at a conditional write before giving up.
const MAX_WRITE_ATTEMPTS: usize = 5;

/// Enforces the fixed per-action quotas against the durable ledger.
///
/// Rejected attempts are not recorded, so a device cannot burn quota by
/// probing once it is already limited.
#[derive(Clone)]
pub struct RateLimitService {
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
}

impl RateLimitService {
    pub fn new(store: Arc<dyn RateLimitStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Decide whether the action identified by `key` is permitted and record it.
    ///
    /// Any storage failure is returned as an error; it is never turned into
    /// an allowed decision.
    pub async fn check_and_record(&self, key: &RateLimitKey) -> Result<RateLimitDecision, DomainError> {
        let action = key.action_type;
        let policy = action.policy();

        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let now = self.now();

            let Some(entry) = self.store.get_by_key(key).await? else {
                let first = RateLimitEntry {
                    key: key.clone(),
                    action_count: 1,
                    last_action_at: now,
                };
                if self.store.insert_if_absent(&first).await? {
                    tracing::debug!(action = %action, "First action recorded");
                    return Ok(RateLimitDecision::allowed(1, policy));
                }
                tracing::debug!(attempt, "Lost insert race, retrying");
                continue;
            };

            let next_count = if policy.window_elapsed(entry.last_action_at, now) {
                1
            } else {
                let tentative = entry.action_count.saturating_add(1);
                if tentative > policy.max_count {
                    tracing::info!(
                        action = %action,
                        count = tentative,
                        max_count = policy.max_count,
                        "Rate limit exceeded"
                    );
                    return Ok(RateLimitDecision::denied(tentative, action, policy));
                }
                tentative
            };

            if self.store.upsert_count(&entry, next_count, now).await? {
                tracing::debug!(action = %action, count = next_count, "Action recorded");
                return Ok(RateLimitDecision::allowed(next_count, policy));
            }
            tracing::debug!(attempt, "Ledger entry changed concurrently, retrying");
        }

        tracing::warn!(action = %action, "Giving up on contended rate-limit entry");
        Err(DomainError::Storage(RepoError::Query(
            "rate-limit entry is under contention".to_string(),
        )))
    }

    // Postgres keeps microseconds; truncating keeps the compare-and-set exact.
    fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ActionType;
    use crate::ports::SystemClock;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct BrokenStore;

    #[async_trait]
    impl RateLimitStore for BrokenStore {
        async fn get_by_key(&self, _key: &RateLimitKey) -> Result<Option<RateLimitEntry>, RepoError> {
            Err(RepoError::Connection("refused".into()))
        }

        async fn insert_if_absent(&self, _entry: &RateLimitEntry) -> Result<bool, RepoError> {
            Err(RepoError::Connection("refused".into()))
        }

        async fn upsert_count(
            &self,
            _expected: &RateLimitEntry,
            _count: u32,
            _at: DateTime<Utc>,
        ) -> Result<bool, RepoError> {
            Err(RepoError::Connection("refused".into()))
        }
    }

    /// Always reports an existing entry that some other writer keeps changing.
    struct ContendedStore {
        writes: AtomicUsize,
    }

    #[async_trait]
    impl RateLimitStore for ContendedStore {
        async fn get_by_key(&self, key: &RateLimitKey) -> Result<Option<RateLimitEntry>, RepoError> {
            Ok(Some(RateLimitEntry {
                key: key.clone(),
                action_count: 1,
                last_action_at: Utc::now(),
            }))
        }

        async fn insert_if_absent(&self, _entry: &RateLimitEntry) -> Result<bool, RepoError> {
            Ok(false)
        }

        async fn upsert_count(
            &self,
            _expected: &RateLimitEntry,
            _count: u32,
            _at: DateTime<Utc>,
        ) -> Result<bool, RepoError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(false)
        }
    }

    fn key() -> RateLimitKey {
        RateLimitKey::new("device", "outlet", None, ActionType::QrScan).unwrap()
    }

    #[tokio::test]
    async fn test_storage_failure_fails_closed() {
        let service = RateLimitService::new(Arc::new(BrokenStore), Arc::new(SystemClock));

        let result = service.check_and_record(&key()).await;
        assert!(matches!(result, Err(DomainError::Storage(_))));
    }

    #[tokio::test]
    async fn test_contention_is_bounded() {
        let store = Arc::new(ContendedStore {
            writes: AtomicUsize::new(0),
        });
        let service = RateLimitService::new(store.clone(), Arc::new(SystemClock));

        let result = service.check_and_record(&key()).await;
        assert!(matches!(result, Err(DomainError::Storage(_))));
        assert_eq!(store.writes.load(Ordering::SeqCst), MAX_WRITE_ATTEMPTS);
    }
}
