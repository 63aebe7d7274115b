//! Review session create/update endpoint.

use actix_web::{HttpResponse, web};
use revu_core::domain::NewReviewSession;
use revu_core::services::{ReviewUpdate, SessionOutcome};
use revu_shared::dto::{ReviewSessionRequest, ReviewSessionResponse};
use uuid::Uuid;

use crate::middleware::{AppError, AppResult, TracedResult, WithTrace};
use crate::observability::TraceId;
use crate::state::AppState;

/// With `sessionId` the session is updated (and may claim the incentive),
/// otherwise a new session is created.
///
/// POST /api/review-session
pub async fn upsert_session(
    state: web::Data<AppState>,
    trace: TraceId,
    body: web::Json<ReviewSessionRequest>,
) -> TracedResult<HttpResponse> {
    let outcome = upsert(&state, body.into_inner()).await.traced(&trace)?;

    tracing::info!(
        trace_id = %trace,
        session_id = %outcome.session.id,
        state = ?outcome.session.state(),
        incentive_issued = outcome.incentive.is_some(),
        "Review session saved"
    );

    Ok(HttpResponse::Ok().json(ReviewSessionResponse {
        session: outcome.session,
        incentive: outcome.incentive,
    }))
}

async fn upsert(state: &AppState, req: ReviewSessionRequest) -> AppResult<SessionOutcome> {
    let request_incentive = req.request_incentive.unwrap_or(false);

    match req.session_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        Some(raw) => {
            let id = Uuid::parse_str(raw)
                .map_err(|_| AppError::BadRequest(format!("Invalid sessionId: {}", raw)))?;
            let update = ReviewUpdate {
                review_text: req.review_text,
                review_posted: req.review_posted,
                request_incentive,
            };
            Ok(state.reviews.update(id, update).await?)
        }
        None => {
            let input = NewReviewSession {
                qr_code_id: req.qr_code_id,
                outlet_id: req.outlet_id,
                merchant_id: req.merchant_id,
                device_fingerprint: req.device_fingerprint,
                session_language: req.session_language,
                review_text: req.review_text,
                review_posted: req.review_posted.unwrap_or(false),
            };
            Ok(state.reviews.create(input, request_incentive).await?)
        }
    }
}
