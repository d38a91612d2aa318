//! HTTP router configuration
//!
//! This module provides router setup and route registration for the HTTP runtime.

use std::any::Any;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::{
    catch_panic::CatchPanicLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::runtime::{
    HttpInspectorRuntime,
    error::{panic_response, request_id_middleware},
    handlers::{api_health, api_root, hello, health_check, test_json, validate_token},
};

/// Serverless-style validation path
pub const NETLIFY_VALIDATE_PATH: &str = "/.netlify/functions/validate-token";

const PREFLIGHT_ALLOW_METHODS: &str = "GET, POST, OPTIONS";
const PREFLIGHT_MAX_AGE_SECS: &str = "86400";

impl HttpInspectorRuntime {
    /// Create the Axum router with all endpoints and middleware
    pub fn router(self) -> Router {
        let enable_cors = self.config.enable_cors;
        let verbose_errors = self.config.verbose_errors;
        let max_body_size = self.config.max_body_size;

        let validation_routes = Router::new()
            .route(NETLIFY_VALIDATE_PATH, get(validate_token).post(validate_token))
            .route("/api/validate-token", get(validate_token).post(validate_token))
            .route("/api/validate-token/", get(validate_token).post(validate_token));

        let api_routes = Router::new()
            .route("/api", get(api_root))
            .route("/api/", get(api_root))
            .route("/api/health", get(api_health))
            .route("/api/health/", get(api_health))
            .route("/api/hello", get(hello))
            .route("/api/hello/", get(hello))
            .route("/api/test-json", post(test_json))
            .route("/api/test-json/", post(test_json));

        let mut router = Router::new()
            .route("/health", get(health_check))
            .merge(validation_routes)
            .merge(api_routes)
            .with_state(self)
            .layer(CatchPanicLayer::custom(
                move |panic: Box<dyn Any + Send + 'static>| panic_response(panic, verbose_errors),
            ))
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(max_body_size));

        // Add CORS if enabled
        if enable_cors {
            router = router.layer(CorsLayer::permissive());
        }

        router
            .layer(middleware::from_fn_with_state(enable_cors, preflight_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(request_id_middleware))
    }
}

/// Answer every `OPTIONS` request with `204 No Content`
///
/// Sits outside the CORS layer so preflights never reach a handler. When
/// CORS is enabled the permissive headers are attached here.
async fn preflight_middleware(
    State(enable_cors): State<bool>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::OPTIONS {
        return next.run(request).await;
    }

    let mut response = StatusCode::NO_CONTENT.into_response();
    if enable_cors {
        let allow_headers = request
            .headers()
            .get(header::ACCESS_CONTROL_REQUEST_HEADERS)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("*"));

        let headers = response.headers_mut();
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(PREFLIGHT_ALLOW_METHODS),
        );
        headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, allow_headers);
        headers.insert(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static(PREFLIGHT_MAX_AGE_SECS),
        );
    }

    response
}
