//! # Revu API Server
//!
//! Actix-web entry point for the rate limit, review session and review
//! drafting endpoints.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;

use config::AppConfig;
use middleware::ThrottleMiddleware;
use observability::TraceIdMiddleware;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Revu API Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(&config).await.map_err(|e| {
        tracing::error!(error = %e, "Startup aborted");
        std::io::Error::other(e.to_string())
    })?;

    let trust_proxy_headers = config.trust_proxy_headers;

    HttpServer::new(move || {
        App::new()
            .wrap(
                ThrottleMiddleware::new(state.throttle.clone())
                    .trust_forwarded_for(trust_proxy_headers),
            )
            .wrap(handlers::cors_headers())
            .wrap(TraceIdMiddleware)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
