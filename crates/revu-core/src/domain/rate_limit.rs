use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Kinds of device actions that are subject to a quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    QrScan,
    ReviewSession,
    IncentiveClaim,
}

impl ActionType {
    pub const ALL: [ActionType; 3] = [
        ActionType::QrScan,
        ActionType::ReviewSession,
        ActionType::IncentiveClaim,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::QrScan => "qr_scan",
            ActionType::ReviewSession => "review_session",
            ActionType::IncentiveClaim => "incentive_claim",
        }
    }

    /// The fixed quota applied to this action kind.
    pub fn policy(&self) -> RateLimitPolicy {
        match self {
            ActionType::QrScan => RateLimitPolicy::new(5, 24),
            ActionType::ReviewSession => RateLimitPolicy::new(3, 24),
            ActionType::IncentiveClaim => RateLimitPolicy::new(1, 24),
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionType::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("Unknown action type: {s}")))
    }
}

/// Quota of `max_count` actions per `window_hours`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_count: u32,
    pub window_hours: u32,
}

impl RateLimitPolicy {
    pub const fn new(max_count: u32, window_hours: u32) -> Self {
        Self {
            max_count,
            window_hours,
        }
    }

    pub fn window(&self) -> Duration {
        Duration::hours(i64::from(self.window_hours))
    }

    /// True once strictly more than one window has passed since `last_action_at`.
    pub fn window_elapsed(&self, last_action_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - last_action_at > self.window()
    }
}

/// Identity of a rate-limit ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateLimitKey {
    pub device_fingerprint: String,
    pub outlet_id: String,
    pub qr_code_id: Option<String>,
    pub action_type: ActionType,
}

impl RateLimitKey {
    /// Build a key, rejecting blank identifiers. A QR code is mandatory for
    /// incentive claims.
    pub fn new(
        device_fingerprint: impl Into<String>,
        outlet_id: impl Into<String>,
        qr_code_id: Option<String>,
        action_type: ActionType,
    ) -> Result<Self, DomainError> {
        let device_fingerprint = device_fingerprint.into();
        let outlet_id = outlet_id.into();

        if device_fingerprint.trim().is_empty() {
            return Err(DomainError::validation("deviceFingerprint is required"));
        }
        if outlet_id.trim().is_empty() {
            return Err(DomainError::validation("outletId is required"));
        }

        let qr_code_id = qr_code_id.filter(|id| !id.trim().is_empty());
        if action_type == ActionType::IncentiveClaim && qr_code_id.is_none() {
            return Err(DomainError::validation(
                "qrCodeId is required for incentive_claim",
            ));
        }

        Ok(Self {
            device_fingerprint,
            outlet_id,
            qr_code_id,
            action_type,
        })
    }
}

/// One row of the durable rate-limit ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub key: RateLimitKey,
    pub action_count: u32,
    pub last_action_at: DateTime<Utc>,
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub count: u32,
    pub max_count: u32,
    pub reset_after_hours: u32,
    pub message: String,
}

impl RateLimitDecision {
    pub fn allowed(count: u32, policy: RateLimitPolicy) -> Self {
        Self {
            allowed: true,
            count,
            max_count: policy.max_count,
            reset_after_hours: policy.window_hours,
            message: "Action allowed".to_string(),
        }
    }

    pub fn denied(count: u32, action: ActionType, policy: RateLimitPolicy) -> Self {
        Self {
            allowed: false,
            count,
            max_count: policy.max_count,
            reset_after_hours: policy.window_hours,
            message: format!(
                "Rate limit exceeded: at most {} {} actions per {} hours",
                policy.max_count, action, policy.window_hours
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_table() {
        assert_eq!(ActionType::QrScan.policy(), RateLimitPolicy::new(5, 24));
        assert_eq!(ActionType::ReviewSession.policy(), RateLimitPolicy::new(3, 24));
        assert_eq!(ActionType::IncentiveClaim.policy(), RateLimitPolicy::new(1, 24));
    }

    #[test]
    fn test_action_type_parsing() {
        assert_eq!("qr_scan".parse::<ActionType>().unwrap(), ActionType::QrScan);
        assert_eq!(
            "incentive_claim".parse::<ActionType>().unwrap(),
            ActionType::IncentiveClaim
        );
        assert!(matches!(
            "page_view".parse::<ActionType>(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_window_elapsed_is_strict() {
        let policy = ActionType::QrScan.policy();
        let last = Utc::now();

        assert!(!policy.window_elapsed(last, last + Duration::hours(24)));
        assert!(policy.window_elapsed(last, last + Duration::hours(24) + Duration::seconds(1)));
    }

    #[test]
    fn test_key_requires_qr_code_for_incentive_claim() {
        let err = RateLimitKey::new("dev", "outlet", None, ActionType::IncentiveClaim);
        assert!(matches!(err, Err(DomainError::Validation(_))));

        let blank = RateLimitKey::new("dev", "outlet", Some("  ".into()), ActionType::IncentiveClaim);
        assert!(blank.is_err());

        let ok = RateLimitKey::new("dev", "outlet", Some("qr".into()), ActionType::IncentiveClaim);
        assert!(ok.is_ok());
    }

    #[test]
    fn test_key_rejects_blank_identifiers() {
        assert!(RateLimitKey::new("", "outlet", None, ActionType::QrScan).is_err());
        assert!(RateLimitKey::new("dev", " ", None, ActionType::QrScan).is_err());
    }
}
