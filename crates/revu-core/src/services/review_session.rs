//! Review session lifecycle and single-claim incentive issuance.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{
    Incentive, IncentiveClaim, IssuedIncentive, NewReviewSession, ReviewPatch, ReviewSession, redemption,
};
use crate::error::DomainError;
use crate::ports::{Clock, IncentiveStore, ReviewSessionStore};

/// Changes requested for an existing session.
#[derive(Debug, Clone, Default)]
pub struct ReviewUpdate {
    pub review_text: Option<String>,
    pub review_posted: Option<bool>,
    pub request_incentive: bool,
}

/// Session plus the incentive issued during this call, if any.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub session: ReviewSession,
    pub incentive: Option<IssuedIncentive>,
}

#[derive(Clone)]
pub struct ReviewSessionService {
    sessions: Arc<dyn ReviewSessionStore>,
    incentives: Arc<dyn IncentiveStore>,
    clock: Arc<dyn Clock>,
}

impl ReviewSessionService {
    pub fn new(
        sessions: Arc<dyn ReviewSessionStore>,
        incentives: Arc<dyn IncentiveStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sessions,
            incentives,
            clock,
        }
    }

    /// Start a session. When the review is already posted and an incentive is
    /// requested, the code is attached before the single insert.
    pub async fn create(
        &self,
        input: NewReviewSession,
        request_incentive: bool,
    ) -> Result<SessionOutcome, DomainError> {
        input.validate()?;

        let mut session = ReviewSession::new(input, self.clock.now());
        let mut issued = None;

        if request_incentive && session.review_posted {
            if let Some(incentive) = self.eligible_incentive(&session.merchant_id).await? {
                let claim = IncentiveClaim {
                    incentive_id: incentive.id,
                    code: redemption::generate_code(incentive.code_prefix.as_deref()),
                };
                session.claim(&claim);
                issued = Some(IssuedIncentive {
                    incentive,
                    code: claim.code,
                });
            }
        }

        let session = self.sessions.insert(session).await?;
        tracing::info!(
            session_id = %session.id,
            outlet_id = %session.outlet_id,
            incentive_issued = issued.is_some(),
            "Review session created"
        );

        Ok(SessionOutcome {
            session,
            incentive: issued,
        })
    }

    /// Update review fields and optionally claim the merchant's incentive.
    pub async fn update(
        &self,
        session_id: Uuid,
        update: ReviewUpdate,
    ) -> Result<SessionOutcome, DomainError> {
        let current = self
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Review session", session_id))?;

        let patch = ReviewPatch {
            review_text: update.review_text,
            review_posted: update.review_posted,
        };
        let posted = patch.review_posted.unwrap_or(current.review_posted);

        if current.incentive_claimed {
            if update.request_incentive && posted {
                return Err(already_claimed(session_id));
            }
            return Ok(closed(current));
        }

        if update.request_incentive && posted {

            if let Some(incentive) = self.eligible_incentive(&current.merchant_id).await? {
                let claim = IncentiveClaim {
                    incentive_id: incentive.id,
                    code: redemption::generate_code(incentive.code_prefix.as_deref()),
                };

                let session = self
                    .sessions
                    .compare_and_set_claimed(session_id, &patch, &claim, self.clock.now())
                    .await?
                    .ok_or_else(|| already_claimed(session_id))?;

                tracing::info!(
                    session_id = %session.id,
                    incentive_id = %incentive.id,
                    "Incentive issued"
                );

                return Ok(SessionOutcome {
                    session,
                    incentive: Some(IssuedIncentive {
                        incentive,
                        code: claim.code,
                    }),
                });
            }

            tracing::info!(
                session_id = %session_id,
                merchant_id = %current.merchant_id,
                "No active incentive, skipping issuance"
            );
        }

        let Some(session) = self
            .sessions
            .apply_review(session_id, &patch, self.clock.now())
            .await?
        else {
            // Claimed by a concurrent request, or deleted, since we read it.
            return match self.sessions.find_by_id(session_id).await? {
                Some(session) => Ok(closed(session)),
                None => Err(DomainError::not_found("Review session", session_id)),
            };
        };

        tracing::debug!(session_id = %session.id, state = ?session.state(), "Review session updated");

        Ok(SessionOutcome {
            session,
            incentive: None,
        })
    }

    async fn eligible_incentive(
        &self,
        merchant_id: &str,
    ) -> Result<Option<Incentive>, DomainError> {
        Ok(self.incentives.find_active_for_merchant(merchant_id).await?)
    }
}

/// Sessions that issued an incentive are final; review changes are dropped.
fn closed(session: ReviewSession) -> SessionOutcome {
    tracing::debug!(session_id = %session.id, "Session already issued an incentive, review unchanged");
    SessionOutcome {
        session,
        incentive: None,
    }
}

fn already_claimed(session_id: Uuid) -> DomainError {
    DomainError::Conflict(format!(
        "Incentive already redeemed for session {session_id}"
    ))
}
