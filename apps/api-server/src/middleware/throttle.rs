//! Per-client request throttle middleware.

use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::Method,
};
use revu_core::ports::RequestThrottle;
use revu_shared::ErrorBody;
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

use crate::observability::TraceId;

/// Throttle middleware factory. With no throttle configured every request
/// passes through.
///
/// Clients are keyed by peer IP. Forwarding headers are honored only after
/// [`ThrottleMiddleware::trust_forwarded_for`].
pub struct ThrottleMiddleware {
    throttle: Option<Arc<dyn RequestThrottle>>,
    trust_forwarded: bool,
}

impl ThrottleMiddleware {
    pub fn new(throttle: Option<Arc<dyn RequestThrottle>>) -> Self {
        Self {
            throttle,
            trust_forwarded: false,
        }
    }

    /// Key on `Forwarded`/`X-Forwarded-For` when a trusted proxy sets them.
    pub fn trust_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded = trust;
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for ThrottleMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = ThrottleService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ThrottleService {
            service: Rc::new(service),
            throttle: self.throttle.clone(),
            trust_forwarded: self.trust_forwarded,
        }))
    }
}

pub struct ThrottleService<S> {
    service: Rc<S>,
    throttle: Option<Arc<dyn RequestThrottle>>,
    trust_forwarded: bool,
}

impl<S, B> Service<ServiceRequest> for ThrottleService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let throttle = match &self.throttle {
            // Preflights are free.
            Some(throttle) if req.method() != Method::OPTIONS => throttle.clone(),
            _ => {
                return Box::pin(async move {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                });
            }
        };

        let key = client_key(&req, self.trust_forwarded);

        Box::pin(async move {
            match throttle.check(&key).await {
                Ok(result) if !result.allowed => {
                    let trace_id = req.extensions().get::<TraceId>().cloned();
                    let retry_after = result.retry_after.as_secs().max(1);
                    tracing::warn!(client = %key, retry_after, "Request throttled");

                    let mut body = ErrorBody::new("TooManyRequests").with_message(format!(
                        "Too many requests. Try again in {} seconds.",
                        retry_after
                    ));
                    if let Some(trace_id) = trace_id {
                        body = body.with_trace_id(trace_id.as_str());
                    }

                    let response = HttpResponse::TooManyRequests()
                        .insert_header(("Retry-After", retry_after.to_string()))
                        .json(body);

                    let (http_req, _payload) = req.into_parts();
                    Ok(ServiceResponse::new(http_req, response).map_into_right_body())
                }
                outcome => {
                    // Throttle backend errors fail open.
                    if let Err(e) = outcome {
                        tracing::error!(error = %e, "Request throttle error, failing open");
                    }

                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
            }
        })
    }
}

fn client_key(req: &ServiceRequest, trust_forwarded: bool) -> String {
    if trust_forwarded {
        if let Some(addr) = req.connection_info().realip_remote_addr() {
            return addr.to_string();
        }
    }
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
