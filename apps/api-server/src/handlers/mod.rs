//! HTTP handlers and route configuration.

mod generate_review;
mod health;
mod rate_limit;
mod review_session;

#[cfg(test)]
mod tests;

use actix_web::{HttpRequest, HttpResponse, error, http::Method, middleware::DefaultHeaders, web};

use crate::middleware::{AppError, TracedResult};
use crate::observability::TraceId;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::resource("/rate-limit")
                    .route(web::post().to(rate_limit::check_rate_limit))
                    .route(web::method(Method::OPTIONS).to(preflight))
                    .default_service(web::to(method_not_allowed)),
            )
            .service(
                web::resource("/review-session")
                    .route(web::post().to(review_session::upsert_session))
                    .route(web::method(Method::OPTIONS).to(preflight))
                    .default_service(web::to(method_not_allowed)),
            )
            .service(
                web::resource("/generate-review")
                    .route(web::post().to(generate_review::generate_review))
                    .route(web::method(Method::OPTIONS).to(preflight))
                    .default_service(web::to(method_not_allowed)),
            ),
    );
}

/// CORS headers added to every response. Browsers call the API straight
/// from the QR landing page, so any origin is accepted.
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add((
            "Access-Control-Allow-Headers",
            "authorization, x-client-info, apikey, content-type",
        ))
        .add(("Access-Control-Allow-Methods", "POST, OPTIONS"))
}

/// Malformed or mistyped JSON becomes a 400 carrying the trace ID.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req: &HttpRequest| {
        let message = match &err {
            error::JsonPayloadError::ContentType => "Content-Type must be application/json".to_string(),
            other => format!("Invalid request body: {}", other),
        };
        AppError::BadRequest(message).traced(&TraceId::of(req)).into()
    })
}

async fn preflight() -> HttpResponse {
    HttpResponse::Ok().finish()
}

async fn method_not_allowed(trace: TraceId) -> TracedResult<HttpResponse> {
    Err(AppError::MethodNotAllowed.traced(&trace))
}

/// Names of the fields that are blank, in the order given.
fn missing_fields<'a>(fields: &[(&'a str, &str)]) -> Vec<&'a str> {
    fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect()
}

fn require(fields: &[(&str, &str)]) -> Result<(), AppError> {
    let missing = missing_fields(fields);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}
