//! Response envelopes shared by every JSON endpoint
//!
//! Success bodies look like
//! `{"success": true, "payload": ..., "message": ..., "timestamp": ...}` and
//! error bodies like
//! `{"success": false, "error": {"code", "message", "details", "statusCode"}, "timestamp": ...}`.

use axum::response::{IntoResponse, Json, Response};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokenlens_core::ErrorCode;

/// Current time as an RFC 3339 string with millisecond precision
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Successful response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub payload: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn new(payload: T) -> Self {
        Self {
            success: true,
            payload,
            message: None,
            timestamp: timestamp_now(),
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// The `error` object of a failed response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    pub status_code: u16,
}

/// Failed response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: ApiErrorBody,
    pub timestamp: String,
}

impl ApiErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Option<Value>) -> Self {
        Self {
            success: false,
            error: ApiErrorBody {
                code,
                message: message.into(),
                details,
                status_code: code.status_code(),
            },
            timestamp: timestamp_now(),
        }
    }
}
