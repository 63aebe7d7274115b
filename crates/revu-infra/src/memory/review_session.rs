use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use revu_core::RepoError;
use revu_core::domain::{IncentiveClaim, ReviewPatch, ReviewSession};
use revu_core::ports::ReviewSessionStore;

/// Review sessions held in memory.
#[derive(Default)]
pub struct InMemoryReviewSessionStore {
    sessions: RwLock<HashMap<Uuid, ReviewSession>>,
}

impl InMemoryReviewSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl ReviewSessionStore for InMemoryReviewSessionStore {
    async fn insert(&self, session: ReviewSession) -> Result<ReviewSession, RepoError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ReviewSession>, RepoError> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn apply_review(
        &self,
        id: Uuid,
        patch: &ReviewPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<ReviewSession>, RepoError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&id) {
            Some(session) if !session.incentive_claimed => {
                session.apply(patch, now);
                Ok(Some(session.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn compare_and_set_claimed(
        &self,
        id: Uuid,
        patch: &ReviewPatch,
        claim: &IncentiveClaim,
        now: DateTime<Utc>,
    ) -> Result<Option<ReviewSession>, RepoError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&id) {
            Some(session) if !session.incentive_claimed => {
                session.apply(patch, now);
                session.claim(claim);
                Ok(Some(session.clone()))
            }
            _ => Ok(None),
        }
    }
}
