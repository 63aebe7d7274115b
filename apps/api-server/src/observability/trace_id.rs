//! Trace ID middleware - tags each request with an identifier that appears in
//! every log line and every error body.

use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{HeaderName, HeaderValue},
};
use std::fmt;
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use tracing::Instrument;
use uuid::Uuid;

/// Response header carrying the trace ID. Inbound values are logged as
/// `client_trace_id`, never adopted.
pub static TRACE_ID_HEADER: &str = "x-trace-id";

/// Longest client-supplied trace ID we log.
const MAX_TRACE_ID_LEN: usize = 64;

/// Middleware that assigns a trace ID at request start.
pub struct TraceIdMiddleware;

impl<S, B> Transform<S, ServiceRequest> for TraceIdMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = TraceIdService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceIdService { service }))
    }
}

pub struct TraceIdService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for TraceIdService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Always server-minted; a client-supplied ID is only recorded alongside
        let trace_id = Uuid::new_v4().to_string();
        let client_trace_id = req
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| is_acceptable(v))
            .map(String::from);

        req.extensions_mut().insert(TraceId(trace_id.clone()));

        let span = tracing::info_span!(
            "request",
            trace_id = %trace_id,
            client_trace_id = tracing::field::Empty,
            method = %req.method(),
            path = %req.path(),
        );
        if let Some(client_trace_id) = &client_trace_id {
            span.record("client_trace_id", client_trace_id.as_str());
        }

        let fut = {
            let _guard = span.enter();
            self.service.call(req)
        };

        Box::pin(
            async move {
                let mut res = fut.await?;

                res.headers_mut().insert(
                    HeaderName::from_static(TRACE_ID_HEADER),
                    HeaderValue::from_str(&trace_id)
                        .unwrap_or_else(|_| HeaderValue::from_static("unknown")),
                );

                Ok(res)
            }
            .instrument(span),
        )
    }
}

fn is_acceptable(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_TRACE_ID_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Trace ID of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceId(pub String);

impl TraceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trace ID stored by the middleware, or a fresh one if it did not run.
    pub fn of(req: &actix_web::HttpRequest) -> Self {
        req.extensions()
            .get::<TraceId>()
            .cloned()
            .unwrap_or_else(|| TraceId(Uuid::new_v4().to_string()))
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extractor to get the trace ID in handlers.
impl actix_web::FromRequest for TraceId {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &actix_web::HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(Ok(TraceId::of(req)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test, web};

    #[actix_web::test]
    async fn test_client_trace_id_is_not_adopted() {
        let app = test::init_service(App::new().wrap(TraceIdMiddleware).route(
            "/",
            web::get().to(|trace_id: TraceId| async move {
                HttpResponse::Ok().body(trace_id.0)
            }),
        ))
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((TRACE_ID_HEADER, "client-chosen-id"))
            .to_request();
        let res = test::call_service(&app, req).await;

        let header = res
            .headers()
            .get(TRACE_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(Uuid::parse_str(&header).is_ok());

        let body = test::read_body(res).await;
        assert_eq!(body, header.as_bytes());
        assert_ne!(header, "client-chosen-id");
    }

    #[::core::prelude::v1::test]
    fn test_client_trace_ids_are_sanitized() {
        assert!(is_acceptable("3f0c2a4e-1b2c-4d5e-8f90-0123456789ab"));
        assert!(is_acceptable("client_trace-01"));
        assert!(!is_acceptable(""));
        assert!(!is_acceptable("has space"));
        assert!(!is_acceptable(&"a".repeat(MAX_TRACE_ID_LEN + 1)));
    }
}
