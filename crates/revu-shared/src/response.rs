//! Error body returned by every endpoint.

use serde::{Deserialize, Serialize};

/// Structured JSON error: `{ "error": ..., "message": ..., "traceId": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Short error kind, e.g. "ValidationError".
    pub error: String,

    /// Human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Per-request trace identifier, for matching client reports to server logs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
            trace_id: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    // Common error constructors
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("ValidationError").with_message(message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NotFoundError").with_message(message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("ConflictError").with_message(message)
    }

    pub fn internal_error() -> Self {
        Self::new("StorageError").with_message("An internal error occurred")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_are_omitted() {
        let json = serde_json::to_value(ErrorBody::new("MethodNotAllowed")).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "MethodNotAllowed" }));
    }

    #[test]
    fn test_trace_id_is_camel_case() {
        let body = ErrorBody::conflict("already redeemed").with_trace_id("abc");
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json["error"], "ConflictError");
        assert_eq!(json["traceId"], "abc");
    }
}
