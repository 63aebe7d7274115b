use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Incentive, IncentiveClaim, ReviewPatch, ReviewSession};
use crate::error::RepoError;

/// Review session persistence.
#[async_trait]
pub trait ReviewSessionStore: Send + Sync {
    async fn insert(&self, session: ReviewSession) -> Result<ReviewSession, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ReviewSession>, RepoError>;

    /// Apply review fields only, conditioned on `incentive_claimed` still
    /// being false.
    ///
    /// Returns `Ok(None)` when the session is claimed (or is gone).
    async fn apply_review(
        &self,
        id: Uuid,
        patch: &ReviewPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<ReviewSession>, RepoError>;

    /// Apply review fields and attach `claim` in one write, conditioned on
    /// `incentive_claimed` still being false.
    ///
    /// Returns `Ok(None)` when the session was already claimed (or is gone).
    async fn compare_and_set_claimed(
        &self,
        id: Uuid,
        patch: &ReviewPatch,
        claim: &IncentiveClaim,
        now: DateTime<Utc>,
    ) -> Result<Option<ReviewSession>, RepoError>;
}

/// Read access to merchant incentives.
#[async_trait]
pub trait IncentiveStore: Send + Sync {
    /// The most recently created active incentive for a merchant.
    async fn find_active_for_merchant(
        &self,
        merchant_id: &str,
    ) -> Result<Option<Incentive>, RepoError>;
}
