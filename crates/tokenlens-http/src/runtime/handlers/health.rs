//! Health check handler for the top-level `/health` route

use axum::response::Json;
use serde_json::{Value, json};

use crate::runtime::envelope::timestamp_now;

/// Routes advertised by the top-level health check
pub const SERVER_ENDPOINTS: [&str; 3] = [
    "POST /.netlify/functions/validate-token",
    "GET /.netlify/functions/validate-token",
    "GET /health",
];

/// GET /health - liveness check listing the validation endpoints
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": timestamp_now(),
        "endpoints": SERVER_ENDPOINTS,
    }))
}
