use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Lifecycle position of a review session, derived from its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Created,
    ReviewDrafted,
    ReviewPosted,
    IncentiveIssued,
}

/// A customer's review interaction started from a QR scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSession {
    pub id: Uuid,
    pub qr_code_id: String,
    pub outlet_id: String,
    pub merchant_id: String,
    pub device_fingerprint: String,
    pub session_language: String,
    pub review_text: Option<String>,
    pub review_posted: bool,
    pub incentive_id: Option<Uuid>,
    pub incentive_claimed: bool,
    pub incentive_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReviewSession {
    /// Create a new session row from validated input.
    pub fn new(input: NewReviewSession, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            qr_code_id: input.qr_code_id,
            outlet_id: input.outlet_id,
            merchant_id: input.merchant_id,
            device_fingerprint: input.device_fingerprint,
            session_language: input.session_language,
            review_text: normalize_text(input.review_text),
            review_posted: input.review_posted,
            incentive_id: None,
            incentive_claimed: false,
            incentive_code: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.incentive_claimed {
            SessionState::IncentiveIssued
        } else if self.review_posted {
            SessionState::ReviewPosted
        } else if self.review_text.is_some() {
            SessionState::ReviewDrafted
        } else {
            SessionState::Created
        }
    }

    /// Apply review fields in place.
    pub fn apply(&mut self, patch: &ReviewPatch, now: DateTime<Utc>) {
        if let Some(text) = &patch.review_text {
            self.review_text = normalize_text(Some(text.clone()));
        }
        if let Some(posted) = patch.review_posted {
            self.review_posted = posted;
        }
        self.updated_at = now;
    }

    /// Attach an issued incentive. Callers must have checked `incentive_claimed`.
    pub fn claim(&mut self, claim: &IncentiveClaim) {
        self.incentive_id = Some(claim.incentive_id);
        self.incentive_code = Some(claim.code.clone());
        self.incentive_claimed = true;
    }
}

/// Required fields for starting a session.
#[derive(Debug, Clone, Default)]
pub struct NewReviewSession {
    pub qr_code_id: String,
    pub outlet_id: String,
    pub merchant_id: String,
    pub device_fingerprint: String,
    pub session_language: String,
    pub review_text: Option<String>,
    pub review_posted: bool,
}

impl NewReviewSession {
    pub fn validate(&self) -> Result<(), DomainError> {
        let required = [
            ("qrCodeId", &self.qr_code_id),
            ("outletId", &self.outlet_id),
            ("merchantId", &self.merchant_id),
            ("deviceFingerprint", &self.device_fingerprint),
            ("sessionLanguage", &self.session_language),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Review fields to change on an existing session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewPatch {
    pub review_text: Option<String>,
    pub review_posted: Option<bool>,
}

/// Incentive attached to a session by a successful claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncentiveClaim {
    pub incentive_id: Uuid,
    pub code: String,
}

fn normalize_text(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}
