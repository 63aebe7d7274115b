use std::sync::Arc;

use actix_web::{App, dev::ServiceResponse, http::StatusCode, test, web};
use async_trait::async_trait;
use serde_json::{Value, json};

use revu_core::domain::{Incentive, ReviewPrompt, redemption};
use revu_core::ports::{GenerationError, ReviewTextGenerator};
use revu_core::services::ReviewWriter;
use revu_infra::{
    InMemoryIncentiveStore, InMemoryRateLimitStore, InMemoryReviewSessionStore, ManualClock,
};

use super::{configure_routes, cors_headers, missing_fields};
use crate::observability::TraceIdMiddleware;
use crate::state::AppState;

const TRACE_ID_HEADER: &str = "x-trace-id";

async fn state_with(incentives: Vec<Incentive>) -> AppState {
    let incentive_store = Arc::new(InMemoryIncentiveStore::new());
    for incentive in incentives {
        incentive_store.insert(incentive).await;
    }

    AppState::from_stores(
        Arc::new(InMemoryRateLimitStore::new()),
        Arc::new(InMemoryReviewSessionStore::new()),
        incentive_store,
        Arc::new(ManualClock::default()),
    )
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(cors_headers())
                .wrap(TraceIdMiddleware)
                .app_data(web::Data::new($state))
                .configure(configure_routes),
        )
        .await
    };
}

async fn json_body(res: ServiceResponse) -> Value {
    test::read_body_json(res).await
}

fn post(uri: &str, body: Value) -> test::TestRequest {
    test::TestRequest::post().uri(uri).set_json(body)
}

fn session_body() -> Value {
    json!({
        "qrCodeId": "QR1",
        "outletId": "O1",
        "merchantId": "M1",
        "deviceFingerprint": "D1",
        "sessionLanguage": "en"
    })
}

#[actix_web::test]
async fn test_rate_limit_counts_and_denies() {
    let app = app!(state_with(vec![]).await);
    let body = json!({
        "deviceFingerprint": "D1",
        "outletId": "O1",
        "qrCodeId": "QR1",
        "actionType": "incentive_claim"
    });

    let res = test::call_service(&app, post("/api/rate-limit", body.clone()).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let first = json_body(res).await;
    assert_eq!(first["allowed"], true);
    assert_eq!(first["count"], 1);
    assert_eq!(first["maxCount"], 1);
    assert_eq!(first["resetAfter"], 24);

    let res = test::call_service(&app, post("/api/rate-limit", body).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let second = json_body(res).await;
    assert_eq!(second["allowed"], false);
    assert_eq!(second["count"], 2);
    assert!(second["message"].as_str().unwrap().contains("Rate limit exceeded"));
}

#[actix_web::test]
async fn test_rate_limit_validation_errors_carry_trace_id() {
    let app = app!(state_with(vec![]).await);

    let req = post("/api/rate-limit", json!({ "outletId": "O1" }))
        .insert_header((TRACE_ID_HEADER, "client-trace-1"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let header = res
        .headers()
        .get(TRACE_ID_HEADER)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_ne!(header, "client-trace-1");
    assert!(uuid::Uuid::parse_str(&header).is_ok());

    let body = json_body(res).await;
    assert_eq!(body["error"], "ValidationError");
    assert_eq!(body["message"], "Missing required fields: deviceFingerprint, actionType");
    assert_eq!(body["traceId"], header.as_str());

    let unknown = json!({ "deviceFingerprint": "D1", "outletId": "O1", "actionType": "page_view" });
    let res = test::call_service(&app, post("/api/rate-limit", unknown).to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(res).await["traceId"].is_string());
}

#[actix_web::test]
async fn test_malformed_json_is_a_validation_error() {
    let app = app!(state_with(vec![]).await);

    let req = test::TestRequest::post()
        .uri("/api/rate-limit")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(res).await["error"], "ValidationError");

    let typo = json!({ "deviceFingerprint": "D1", "outletId": "O1", "actionType": "qr_scan", "outlet": "x" });
    let res = test::call_service(&app, post("/api/rate-limit", typo).to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_preflight_and_method_not_allowed() {
    let app = app!(state_with(vec![]).await);

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/api/review-session")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get("access-control-allow-origin").unwrap(), "*");
    assert_eq!(
        res.headers().get("access-control-allow-methods").unwrap(),
        "POST, OPTIONS"
    );

    let req = test::TestRequest::get().uri("/api/rate-limit").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(res.headers().contains_key("access-control-allow-origin"));
    assert_eq!(json_body(res).await["error"], "MethodNotAllowed");
}

#[actix_web::test]
async fn test_review_session_create_then_claim_once() {
    let app = app!(state_with(vec![Incentive::new("M1", "Free drink").with_code_prefix("DRINK")]).await);

    let res = test::call_service(&app, post("/api/review-session", session_body()).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let created = json_body(res).await;
    assert_eq!(created["session"]["incentiveClaimed"], false);
    assert!(created.get("incentive").is_none());
    let session_id = created["session"]["id"].as_str().unwrap().to_string();

    let claim = json!({
        "sessionId": session_id,
        "reviewText": "Great coffee",
        "reviewPosted": true,
        "requestIncentive": true
    });

    let res = test::call_service(&app, post("/api/review-session", claim.clone()).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let claimed = json_body(res).await;
    assert_eq!(claimed["session"]["incentiveClaimed"], true);
    assert_eq!(claimed["session"]["reviewText"], "Great coffee");
    assert_eq!(claimed["incentive"]["title"], "Free drink");
    let code = claimed["incentive"]["code"].as_str().unwrap();
    assert!(redemption::is_well_formed(code, Some("DRINK")));
    assert_eq!(claimed["session"]["incentiveCode"], code);

    let res = test::call_service(&app, post("/api/review-session", claim).to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(res).await["error"], "ConflictError");
}

#[actix_web::test]
async fn test_review_session_errors() {
    let app = app!(state_with(vec![]).await);

    let res = test::call_service(&app, post("/api/review-session", json!({ "outletId": "O1" })).to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = json_body(res).await;
    assert!(body["message"].as_str().unwrap().contains("qrCodeId"));

    let unknown = json!({ "sessionId": uuid::Uuid::new_v4().to_string(), "reviewText": "Hi" });
    let res = test::call_service(&app, post("/api/review-session", unknown).to_request()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(res).await["error"], "NotFoundError");

    let malformed = json!({ "sessionId": "not-a-uuid" });
    let res = test::call_service(&app, post("/api/review-session", malformed).to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

struct Canned;

#[async_trait]
impl ReviewTextGenerator for Canned {
    async fn generate(&self, prompt: &ReviewPrompt) -> Result<String, GenerationError> {
        Ok(format!(" {} was lovely. ", prompt.outlet_name))
    }
}

#[actix_web::test]
async fn test_generate_review() {
    let disabled = app!(state_with(vec![]).await);
    let body = json!({ "outletName": "Kopi Corner", "rating": 5 });

    let res = test::call_service(&disabled, post("/api/generate-review", body.clone()).to_request()).await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    let state = state_with(vec![])
        .await
        .with_writer(ReviewWriter::new(Some(Arc::new(Canned))));
    let enabled = app!(state);

    let res = test::call_service(&enabled, post("/api/generate-review", body).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await["reviewText"], "Kopi Corner was lovely.");

    let bad_rating = json!({ "outletName": "Kopi Corner", "rating": 9 });
    let res = test::call_service(&enabled, post("/api/generate-review", bad_rating).to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_health() {
    let app = app!(state_with(vec![]).await);
    let res = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await["status"], "ok");
}

#[actix_web::test]
async fn test_missing_fields_keeps_order() {
    let missing = missing_fields(&[("a", ""), ("b", "x"), ("c", "  ")]);
    assert_eq!(missing, vec!["a", "c"]);
}
