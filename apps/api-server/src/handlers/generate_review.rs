//! AI-drafted review text.

use actix_web::{HttpResponse, web};
use revu_core::domain::ReviewPrompt;
use revu_shared::dto::{GenerateReviewRequest, GenerateReviewResponse};

use crate::middleware::{TracedResult, WithTrace};
use crate::observability::TraceId;
use crate::state::AppState;

/// POST /api/generate-review
pub async fn generate_review(
    state: web::Data<AppState>,
    trace: TraceId,
    body: web::Json<GenerateReviewRequest>,
) -> TracedResult<HttpResponse> {
    let req = body.into_inner();
    let prompt = ReviewPrompt {
        outlet_name: req.outlet_name,
        rating: req.rating,
        highlights: req.highlights,
        language: req.language,
    };

    let review_text = state.writer.generate(&prompt).await.traced(&trace)?;
    tracing::debug!(trace_id = %trace, chars = review_text.len(), "Review drafted");

    Ok(HttpResponse::Ok().json(GenerateReviewResponse { review_text }))
}
