//! Diagnostic handlers mounted under `/api`

use axum::{
    body::Bytes,
    extract::Extension,
    http::{HeaderMap, header},
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::runtime::{
    envelope::{ApiResponse, timestamp_now},
    error::RequestIdExtension,
};

/// Service name reported by the `/api` endpoints
pub const SERVICE_NAME: &str = "tokenlens-http";

/// Routes advertised by `GET /api`
pub const API_ENDPOINTS: [&str; 6] = [
    "POST /api/validate-token",
    "GET /api/validate-token",
    "POST /api/test-json",
    "GET /api/hello",
    "GET /api/health",
    "GET /api/",
];

const RUNNING_MESSAGE: &str = "API is running";

#[derive(Debug, Serialize)]
pub struct ApiRootPayload {
    pub status: &'static str,
    pub timestamp: String,
    pub service: &'static str,
    pub endpoints: [&'static str; 6],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealthPayload {
    pub status: &'static str,
    pub timestamp: String,
    pub service: &'static str,
    pub request_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HelloPayload {
    pub timestamp: String,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// What the server made of a posted body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestJsonPayload {
    pub received_body: Value,
    pub body_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub body_size: usize,
    pub parsed_successfully: bool,
    pub timestamp: String,
    pub request_id: String,
    pub test_results: TestResults,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResults {
    pub has_body: bool,
    pub is_object: bool,
    pub is_string: bool,
    pub json_parse_worked: bool,
}

/// GET /api - service banner listing the `/api` routes
pub async fn api_root(
    Extension(RequestIdExtension(request_id)): Extension<RequestIdExtension>,
) -> ApiResponse<ApiRootPayload> {
    debug!(request_id = %request_id, "api root accessed");
    ApiResponse::new(ApiRootPayload {
        status: "OK",
        timestamp: timestamp_now(),
        service: SERVICE_NAME,
        endpoints: API_ENDPOINTS,
    })
    .with_message(RUNNING_MESSAGE)
}

/// GET /api/health
pub async fn api_health(
    Extension(RequestIdExtension(request_id)): Extension<RequestIdExtension>,
) -> ApiResponse<ApiHealthPayload> {
    debug!(request_id = %request_id, "health check requested");
    ApiResponse::new(ApiHealthPayload {
        status: "OK",
        timestamp: timestamp_now(),
        service: SERVICE_NAME,
        request_id: request_id.to_string(),
    })
    .with_message(RUNNING_MESSAGE)
}

/// GET /api/hello - echoes the caller's user agent
pub async fn hello(
    Extension(RequestIdExtension(request_id)): Extension<RequestIdExtension>,
    headers: HeaderMap,
) -> ApiResponse<HelloPayload> {
    let user_agent = header_str(&headers, header::USER_AGENT.as_str());
    ApiResponse::new(HelloPayload {
        timestamp: timestamp_now(),
        request_id: request_id.to_string(),
        user_agent,
    })
    .with_message("Hello from tokenlens!")
}

/// POST /api/test-json - reports how the request body was understood
pub async fn test_json(
    Extension(RequestIdExtension(request_id)): Extension<RequestIdExtension>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResponse<TestJsonPayload> {
    let content_type = header_str(&headers, header::CONTENT_TYPE.as_str());
    let inspection = inspect_body(&body);

    info!(
        request_id = %request_id,
        body_type = inspection.body_type,
        content_type = content_type.as_deref().unwrap_or("none"),
        body_len = body.len(),
        "json test requested"
    );

    ApiResponse::new(TestJsonPayload {
        body_size: inspection.value.to_string().len(),
        body_type: inspection.body_type,
        parsed_successfully: inspection.parsed,
        test_results: TestResults {
            has_body: !body.is_empty(),
            is_object: inspection.value.is_object(),
            is_string: inspection.value.is_string(),
            json_parse_worked: inspection.parsed,
        },
        received_body: inspection.value,
        content_type,
        timestamp: timestamp_now(),
        request_id: request_id.to_string(),
    })
    .with_message("JSON Test completed successfully")
}

struct BodyInspection {
    value: Value,
    body_type: &'static str,
    parsed: bool,
}

/// Empty bodies count as parsed; bodies that are not JSON come back as text
fn inspect_body(body: &Bytes) -> BodyInspection {
    if body.is_empty() {
        return BodyInspection {
            value: Value::Null,
            body_type: "undefined",
            parsed: true,
        };
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(value) => BodyInspection {
            body_type: json_type_name(&value),
            value,
            parsed: true,
        },
        Err(_) => BodyInspection {
            value: Value::String(String::from_utf8_lossy(body).into_owned()),
            body_type: "string",
            parsed: false,
        },
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
