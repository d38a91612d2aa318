//! Integration tests for the HTTP endpoints
//!
//! These tests verify that:
//! - Tokens are found in body, query and header in priority order
//! - Every failure maps to the right status code and error envelope
//! - Diagnostic endpoints answer with the success envelope
//! - Preflight requests, request IDs and panics are handled by middleware

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};
use tokenlens_core::{Clock, FixedClock, Inspector};
use tokenlens_http::runtime::{HttpInspectorRuntime, HttpRuntimeConfig, HttpRuntimeConfigBuilder};
use tower::ServiceExt; // for `oneshot` method

const NOW: i64 = 1_700_000_000;

fn create_test_app() -> Router {
    create_app_with_config(HttpRuntimeConfig::default())
}

fn create_app_with_config(config: HttpRuntimeConfig) -> Router {
    create_app_with_clock(config, Arc::new(FixedClock(NOW)))
}

fn create_app_with_clock(config: HttpRuntimeConfig, clock: Arc<dyn Clock>) -> Router {
    let inspector = Inspector::with_clock(config.inspector_config(), clock);
    HttpInspectorRuntime::with_inspector(config, inspector).router()
}

fn signed_token(payload: Value) -> String {
    format!(
        "{}.{}.signature",
        URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(payload.to_string())
    )
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    // Framework rejections such as 413 carry plain-text bodies
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_post_body_token_is_validated() {
    let token = signed_token(json!({
        "sub": "u1",
        "email": "u1@example.com",
        "scope": "openid profile",
        "aud": ["api", "other"],
        "exp": NOW + 3600
    }));

    let (status, _, body) = send(
        create_test_app(),
        post_json("/.netlify/functions/validate-token", json!({ "token": token })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["payload"]["valid"], true);
    assert_eq!(body["payload"]["userId"], "u1");
    assert_eq!(body["payload"]["scope"], json!(["openid", "profile"]));
    assert_eq!(body["payload"]["aud"], "api");
    assert_eq!(
        body["message"],
        "Token validated successfully for user: u1@example.com"
    );
}

#[tokio::test]
async fn test_get_query_token_is_validated() {
    let token = signed_token(json!({ "sub": "u1" }));
    let uri = format!("/.netlify/functions/validate-token?token={token}");

    let (status, _, body) = send(create_test_app(), get(&uri)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Token validated successfully for user: u1");
}

#[tokio::test]
async fn test_bearer_header_is_validated() {
    let request = Request::builder()
        .uri("/api/validate-token")
        .header(header::AUTHORIZATION, "Bearer a.b.c.d.e")
        .body(Body::empty())
        .unwrap();

    let (status, _, body) = send(create_test_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["userId"], "encrypted-user");
    assert_eq!(body["payload"]["exp"], NOW + 3600);
}

#[tokio::test]
async fn test_body_token_wins_over_query_and_header() {
    let body_token = signed_token(json!({ "sub": "from-body" }));
    let query_token = signed_token(json!({ "sub": "from-query" }));

    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/validate-token/?token={query_token}"))
        .header(header::AUTHORIZATION, "Bearer a.b.c.d.e")
        .body(Body::from(json!({ "token": body_token }).to_string()))
        .unwrap();

    let (_, _, body) = send(create_test_app(), request).await;
    assert_eq!(body["payload"]["userId"], "from-body");
}

#[tokio::test]
async fn test_get_with_body_still_reads_body() {
    let token = signed_token(json!({ "sub": "from-body" }));
    let request = Request::builder()
        .method(Method::GET)
        .uri("/.netlify/functions/validate-token")
        .body(Body::from(json!({ "token": token }).to_string()))
        .unwrap();

    let (status, _, body) = send(create_test_app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["userId"], "from-body");
}

#[tokio::test]
async fn test_missing_token() {
    let (status, _, body) = send(
        create_test_app(),
        post_json("/.netlify/functions/validate-token", json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "MISSING_TOKEN");
    assert_eq!(body["error"]["statusCode"], 400);
    assert_eq!(body["error"]["details"]["received_method"], "POST");
}

#[tokio::test]
async fn test_non_bearer_authorization_is_missing_token() {
    let request = Request::builder()
        .uri("/.netlify/functions/validate-token")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();

    let (status, _, body) = send(create_test_app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "MISSING_TOKEN");
    assert_eq!(body["error"]["details"]["received_method"], "GET");
}

#[tokio::test]
async fn test_whitespace_token_is_empty_token() {
    let (status, _, body) = send(
        create_test_app(),
        post_json("/.netlify/functions/validate-token", json!({ "token": "   " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "EMPTY_TOKEN");
    assert_eq!(body["error"]["details"]["token_length"], 3);
}

#[tokio::test]
async fn test_two_segment_token_is_invalid() {
    let (status, _, body) = send(
        create_test_app(),
        post_json("/.netlify/functions/validate-token", json!({ "token": "abc.def" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
    assert_eq!(body["error"]["details"]["token_parts"], 2);
    assert_eq!(body["error"]["details"]["token_preview"], "abc.def...");
}

#[tokio::test]
async fn test_expired_token_is_invalid() {
    let token = signed_token(json!({ "sub": "u1", "exp": NOW - 1 }));
    let (status, _, body) = send(
        create_test_app(),
        post_json("/api/validate-token", json!({ "token": token })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
    assert_eq!(
        body["error"]["message"],
        "Token is invalid, expired, or malformed"
    );
}

#[tokio::test]
async fn test_future_iat_respects_configured_skew() {
    let token = signed_token(json!({ "iat": NOW + 30 }));

    let strict = HttpRuntimeConfigBuilder::new()
        .clock_skew_secs(10)
        .build()
        .unwrap();
    let (status, _, _) = send(
        create_app_with_config(strict),
        post_json("/api/validate-token", json!({ "token": token })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(
        create_test_app(),
        post_json("/api/validate-token", json!({ "token": token })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_top_level_health() {
    let (status, _, body) = send(create_test_app(), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert!(body["timestamp"].is_string());
    assert_eq!(body["endpoints"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_api_root_with_and_without_trailing_slash() {
    for uri in ["/api", "/api/"] {
        let (status, _, body) = send(create_test_app(), get(uri)).await;
        assert_eq!(status, StatusCode::OK, "{uri} should be served");
        assert_eq!(body["success"], true);
        assert_eq!(body["payload"]["status"], "OK");
        assert_eq!(body["payload"]["endpoints"].as_array().unwrap().len(), 6);
    }
}

#[tokio::test]
async fn test_api_health_reports_request_id() {
    let request = Request::builder()
        .uri("/api/health/")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();

    let (status, headers, body) = send(create_test_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["requestId"], "req-42");
    assert_eq!(headers["x-request-id"], "req-42");
}

#[tokio::test]
async fn test_hello_echoes_user_agent() {
    let request = Request::builder()
        .uri("/api/hello")
        .header(header::USER_AGENT, "integration-test/1.0")
        .body(Body::empty())
        .unwrap();

    let (status, _, body) = send(create_test_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["userAgent"], "integration-test/1.0");
}

#[tokio::test]
async fn test_json_echoes_body() {
    let (status, _, body) = send(
        create_test_app(),
        post_json("/api/test-json/", json!({ "hello": "world" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let payload = &body["payload"];
    assert_eq!(payload["receivedBody"], json!({ "hello": "world" }));
    assert_eq!(payload["bodyType"], "object");
    assert_eq!(payload["contentType"], "application/json");
    assert_eq!(payload["testResults"]["isObject"], true);
    assert_eq!(payload["testResults"]["jsonParseWorked"], true);
}

#[tokio::test]
async fn test_options_preflight_returns_no_content() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/.netlify/functions/validate-token")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let (status, headers, body) = send(create_test_app(), request).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(headers.contains_key("x-request-id"));
    assert!(body.is_null());
}

#[tokio::test]
async fn test_options_on_unknown_path_returns_no_content() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/does-not-exist")
        .body(Body::empty())
        .unwrap();

    let (status, _, _) = send(create_test_app(), request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_cors_headers_on_regular_responses() {
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();

    let (_, headers, _) = send(create_test_app(), request).await;
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn test_cors_disabled_omits_headers() {
    let config = HttpRuntimeConfigBuilder::new()
        .enable_cors(false)
        .build()
        .unwrap();
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();

    let (_, headers, _) = send(create_app_with_config(config), request).await;
    assert!(!headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn test_invalid_request_id_is_replaced() {
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "bad id with spaces")
        .body(Body::empty())
        .unwrap();

    let (_, headers, _) = send(create_test_app(), request).await;
    let request_id = headers["x-request-id"].to_str().unwrap();
    assert_ne!(request_id, "bad id with spaces");
    assert!(uuid::Uuid::parse_str(request_id).is_ok());
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let config = HttpRuntimeConfigBuilder::new()
        .max_body_size(16)
        .build()
        .unwrap();
    let (status, _, body) = send(
        create_app_with_config(config),
        Request::builder()
            .method(Method::POST)
            .uri("/.netlify/functions/validate-token")
            .header(header::CONTENT_LENGTH, "64")
            .body(Body::from("x".repeat(64)))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body.get("payload").is_none());
}

#[derive(Debug)]
struct PanickingClock;

impl Clock for PanickingClock {
    fn now_unix(&self) -> i64 {
        panic!("clock unavailable")
    }
}

#[tokio::test]
async fn test_handler_panic_is_internal_server_error() {
    let app = create_app_with_clock(HttpRuntimeConfig::default(), Arc::new(PanickingClock));
    let (status, headers, body) = send(
        app,
        post_json("/.netlify/functions/validate-token", json!({ "token": "a.b.c.d.e" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "INTERNAL_SERVER_ERROR");
    assert!(body["error"].get("details").is_none());
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_verbose_errors_expose_panic_message() {
    let config = HttpRuntimeConfigBuilder::new()
        .verbose_errors(true)
        .build()
        .unwrap();
    let app = create_app_with_clock(config, Arc::new(PanickingClock));
    let (_, _, body) = send(
        app,
        post_json("/api/validate-token", json!({ "token": "a.b.c.d.e" })),
    )
    .await;

    assert_eq!(
        body["error"]["details"]["originalError"],
        "clock unavailable"
    );
}
