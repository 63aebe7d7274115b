//! Device action quota check.

use actix_web::{HttpResponse, web};
use revu_core::domain::{ActionType, RateLimitDecision, RateLimitKey};
use revu_shared::dto::{RateLimitRequest, RateLimitResponse};

use super::require;
use crate::middleware::{AppResult, TracedResult, WithTrace};
use crate::observability::TraceId;
use crate::state::AppState;

/// Count one action against the device's quota.
///
/// POST /api/rate-limit
pub async fn check_rate_limit(
    state: web::Data<AppState>,
    trace: TraceId,
    body: web::Json<RateLimitRequest>,
) -> TracedResult<HttpResponse> {
    let decision = check(&state, body.into_inner()).await.traced(&trace)?;

    tracing::info!(
        trace_id = %trace,
        allowed = decision.allowed,
        count = decision.count,
        max_count = decision.max_count,
        "Rate limit checked"
    );

    Ok(HttpResponse::Ok().json(RateLimitResponse {
        allowed: decision.allowed,
        message: decision.message,
        count: decision.count,
        max_count: decision.max_count,
        reset_after: decision.reset_after_hours,
    }))
}

async fn check(state: &AppState, req: RateLimitRequest) -> AppResult<RateLimitDecision> {
    require(&[
        ("deviceFingerprint", req.device_fingerprint.as_str()),
        ("outletId", req.outlet_id.as_str()),
        ("actionType", req.action_type.as_str()),
    ])?;

    let action: ActionType = req.action_type.trim().parse()?;
    let key = RateLimitKey::new(req.device_fingerprint, req.outlet_id, req.qr_code_id, action)?;

    Ok(state.rate_limits.check_and_record(&key).await?)
}
