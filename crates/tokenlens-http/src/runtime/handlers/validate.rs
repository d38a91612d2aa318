//! Token validation handler
//!
//! Serves both the serverless-style path and the `/api` path. GET and POST
//! behave identically: body, query and header are all consulted in that
//! order, whichever method was used.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Extension, Query, State},
    http::{HeaderMap, Method},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tokenlens_core::{RequestTokenSources, segment_count};
use tracing::{info, warn};

use crate::runtime::{
    HttpInspectorRuntime,
    envelope::ApiResponse,
    error::{ApiError, RequestIdExtension},
};

/// Fallback label when a validated token names neither email nor subject
const UNKNOWN_USER: &str = "unknown";

/// GET|POST /.netlify/functions/validate-token, /api/validate-token
pub async fn validate_token(
    State(runtime): State<HttpInspectorRuntime>,
    Extension(RequestIdExtension(request_id)): Extension<RequestIdExtension>,
    method: Method,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body_json = parse_json_body(&body);
    let sources =
        RequestTokenSources::from_request_parts(body_json.as_ref(), &query, &header_map(&headers));

    match runtime.inspector.inspect_sources(&sources) {
        Ok((inspected, source)) => {
            let user = inspected.claims.display_user().unwrap_or(UNKNOWN_USER);
            info!(
                request_id = %request_id,
                source = %source,
                shape = inspected.shape.as_str(),
                synthetic = inspected.synthetic,
                "token validated"
            );

            let message = format!("Token validated successfully for user: {user}");
            ApiResponse::new(inspected.summary())
                .with_message(message)
                .into_response()
        }
        Err(err) => {
            let raw = sources.extract().map(|(token, _)| token);
            warn!(
                request_id = %request_id,
                method = %method,
                error_code = %err.code(),
                segment_count = raw.map(segment_count),
                reason = %err,
                "token rejected"
            );

            ApiError::from_inspect_error(
                &err,
                raw,
                method.as_str(),
                runtime.config.verbose_errors,
            )
            .into_response()
        }
    }
}

/// Parse a request body as JSON, treating empty or invalid bodies as absent
pub(crate) fn parse_json_body(body: &Bytes) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice(body).ok()
}

/// Header map with lowercase names; values that are not visible ASCII are skipped
fn header_map(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}
