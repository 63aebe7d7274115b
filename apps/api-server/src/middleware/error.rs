//! Error handling - maps failures to `{error, message, traceId}` JSON bodies.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use revu_core::DomainError;
use revu_shared::ErrorBody;
use std::fmt;

use crate::observability::TraceId;

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    MethodNotAllowed,
    Unavailable(String),
    BadGateway(String),
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            // Clients treat an already-redeemed incentive as a bad request.
            AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            AppError::BadRequest(msg) => ErrorBody::validation(msg),
            AppError::NotFound(msg) => ErrorBody::not_found(msg),
            AppError::Conflict(msg) => ErrorBody::conflict(msg),
            AppError::MethodNotAllowed => ErrorBody::new("MethodNotAllowed")
                .with_message("Only POST and OPTIONS are supported"),
            AppError::Unavailable(msg) => ErrorBody::new("ServiceUnavailable").with_message(msg),
            AppError::BadGateway(msg) => ErrorBody::new("UpstreamError").with_message(msg),
            AppError::Internal(_) => ErrorBody::internal_error(),
        }
    }

    /// Attach the request's trace ID.
    pub fn traced(self, trace_id: &TraceId) -> TracedError {
        TracedError {
            error: self,
            trace_id: trace_id.clone(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::MethodNotAllowed => write!(f, "Method not allowed"),
            AppError::Unavailable(msg) => write!(f, "Unavailable: {}", msg),
            AppError::BadGateway(msg) => write!(f, "Bad gateway: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::BadRequest(msg),
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{} with id {} not found", entity_type, id))
            }
            DomainError::Conflict(msg) => AppError::Conflict(msg),
            DomainError::Storage(e) => AppError::Internal(e.to_string()),
            DomainError::Upstream(msg) => AppError::BadGateway(msg),
            DomainError::Unavailable(msg) => AppError::Unavailable(msg),
        }
    }
}

/// An [`AppError`] bound to the request it happened in.
#[derive(Debug)]
pub struct TracedError {
    pub error: AppError,
    pub trace_id: TraceId,
}

impl fmt::Display for TracedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (trace {})", self.error, self.trace_id)
    }
}

impl ResponseError for TracedError {
    fn status_code(&self) -> StatusCode {
        self.error.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        match &self.error {
            AppError::Internal(detail) => {
                tracing::error!(trace_id = %self.trace_id, error = %detail, "Request failed");
            }
            other => {
                tracing::debug!(trace_id = %self.trace_id, error = %other, "Request rejected");
            }
        }

        let body = self.error.body().with_trace_id(self.trace_id.as_str());
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Result type alias for handler internals.
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for handlers.
pub type TracedResult<T> = Result<T, TracedError>;

/// Bind any error convertible to [`AppError`] to a trace ID.
pub trait WithTrace<T> {
    fn traced(self, trace_id: &TraceId) -> TracedResult<T>;
}

impl<T, E: Into<AppError>> WithTrace<T> for Result<T, E> {
    fn traced(self, trace_id: &TraceId) -> TracedResult<T> {
        self.map_err(|e| e.into().traced(trace_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use revu_core::RepoError;

    #[test]
    fn test_domain_errors_map_to_status_codes() {
        let cases = [
            (DomainError::validation("x"), StatusCode::BAD_REQUEST),
            (DomainError::not_found("Review session", "1"), StatusCode::NOT_FOUND),
            (DomainError::Conflict("x".into()), StatusCode::BAD_REQUEST),
            (
                DomainError::Storage(RepoError::Query("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (DomainError::Upstream("x".into()), StatusCode::BAD_GATEWAY),
            (DomainError::Unavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status_code(), status);
        }
    }

    #[actix_web::test]
    async fn test_internal_details_are_not_leaked() {
        let err = AppError::Internal("password=hunter2".into()).traced(&TraceId("t-1".into()));
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body()).await.unwrap();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "StorageError");
        assert_eq!(body.trace_id.as_deref(), Some("t-1"));
        assert!(!body.message.unwrap_or_default().contains("hunter2"));
    }
}
