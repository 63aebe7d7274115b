//! Data Transfer Objects - request/response types for the API.
//!
//! Requests reject unknown fields so typos surface as validation errors
//! instead of being silently ignored.

use serde::{Deserialize, Serialize};

/// POST /api/rate-limit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RateLimitRequest {
    #[serde(default)]
    pub device_fingerprint: String,
    #[serde(default)]
    pub outlet_id: String,
    #[serde(default)]
    pub qr_code_id: Option<String>,
    /// Kept as a string so an unknown kind maps to a 400 with a clear message.
    #[serde(default)]
    pub action_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitResponse {
    pub allowed: bool,
    pub message: String,
    pub count: u32,
    pub max_count: u32,
    /// Window length in hours.
    pub reset_after: u32,
}

/// POST /api/review-session. With `sessionId` it updates, otherwise it creates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReviewSessionRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub qr_code_id: String,
    #[serde(default)]
    pub outlet_id: String,
    #[serde(default)]
    pub merchant_id: String,
    #[serde(default)]
    pub device_fingerprint: String,
    #[serde(default)]
    pub session_language: String,
    #[serde(default)]
    pub review_text: Option<String>,
    #[serde(default)]
    pub review_posted: Option<bool>,
    #[serde(default)]
    pub request_incentive: Option<bool>,
}

/// Response for the review session endpoint. `session` and `incentive` are
/// the server's own records, serialized as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSessionResponse<S, I> {
    pub session: S,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incentive: Option<I>,
}

/// POST /api/generate-review
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GenerateReviewRequest {
    pub outlet_name: String,
    pub rating: u8,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReviewResponse {
    pub review_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result: Result<RateLimitRequest, _> = serde_json::from_value(serde_json::json!({
            "deviceFingerprint": "D1",
            "outletId": "O1",
            "actionType": "qr_scan",
            "device": "typo"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_fields_default_for_validation() {
        let req: ReviewSessionRequest = serde_json::from_value(serde_json::json!({
            "outletId": "O1"
        }))
        .unwrap();
        assert!(req.qr_code_id.is_empty());
        assert_eq!(req.session_id, None);
    }

    #[test]
    fn test_rate_limit_response_shape() {
        let json = serde_json::to_value(RateLimitResponse {
            allowed: false,
            message: "limited".into(),
            count: 4,
            max_count: 3,
            reset_after: 24,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "allowed": false,
                "message": "limited",
                "count": 4,
                "maxCount": 3,
                "resetAfter": 24
            })
        );
    }
}
