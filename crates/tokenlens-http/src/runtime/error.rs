//! Error handling for the HTTP runtime
//!
//! Maps inspection failures onto the error envelope with the right status
//! code and diagnostic details, and provides the request ID middleware that
//! tags every response.

use std::any::Any;
use std::fmt;

use axum::{
    extract::Request,
    http::{
        StatusCode,
        header::{self, HeaderValue},
    },
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::{Value, json};
use tokenlens_core::{ErrorCode, InspectError, segment_count, token_preview};

use crate::runtime::envelope::ApiErrorResponse;

/// Name of the request ID header, read from requests and set on responses
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Ways a caller may supply a token, listed in `MISSING_TOKEN` details
pub const ACCEPTED_METHODS: [&str; 3] = [
    r#"POST body: {"token": "..."}"#,
    "GET query: ?token=...",
    "Header: Authorization: Bearer ...",
];

/// Maximum length for client-provided request IDs
const MAX_REQUEST_ID_LENGTH: usize = 128;

/// Correlation ID attached to a single request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    /// Accept a client-provided ID if it is well-formed
    pub fn parse(id: &str) -> Option<Self> {
        validate_request_id(id).then(|| Self(id.to_string()))
    }

    /// Generate a new random request ID using UUID v4
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extension for storing RequestId in Axum request extensions
#[derive(Debug, Clone)]
pub struct RequestIdExtension(pub RequestId);

/// Valid request IDs are non-empty, at most [`MAX_REQUEST_ID_LENGTH`]
/// characters and contain only ASCII alphanumerics, hyphens and underscores.
/// Anything else could smuggle control characters or field separators into
/// log lines.
fn validate_request_id(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= MAX_REQUEST_ID_LENGTH
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Middleware that extracts or generates a request ID
///
/// Keeps a well-formed `x-request-id` from the client, otherwise generates a
/// UUID. The ID is stored in request extensions and echoed on the response.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(RequestId::parse)
        .unwrap_or_else(RequestId::generate);

    request
        .extensions_mut()
        .insert(RequestIdExtension(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(header_value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(
            header::HeaderName::from_static(REQUEST_ID_HEADER),
            header_value,
        );
    }

    response
}

/// An error rendered as the JSON error envelope
#[derive(Debug, Clone)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<Value>,
}

impl ApiError {
    /// Error with the default message for `code` and no details
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// No token was found in any source
    pub fn missing_token(received_method: &str) -> Self {
        Self::new(ErrorCode::MissingToken).with_details(json!({
            "accepted_methods": ACCEPTED_METHODS,
            "received_method": received_method,
        }))
    }

    /// Unexpected failure; the cause is exposed only when `verbose`
    pub fn internal(cause: impl fmt::Display, verbose: bool) -> Self {
        let error = Self::new(ErrorCode::InternalServerError);
        if verbose {
            error.with_details(json!({ "originalError": cause.to_string() }))
        } else {
            error
        }
    }

    /// Map an inspection failure to its response
    ///
    /// `raw` is the token that was inspected, if one was extracted. It is
    /// only ever echoed back as a short preview.
    pub fn from_inspect_error(
        err: &InspectError,
        raw: Option<&str>,
        received_method: &str,
        verbose: bool,
    ) -> Self {
        match err {
            InspectError::MissingToken => Self::missing_token(received_method),
            InspectError::EmptyToken => Self::new(ErrorCode::EmptyToken).with_details(json!({
                "token_length": raw.map_or(0, |t| t.chars().count()),
            })),
            InspectError::MalformedToken { .. }
            | InspectError::Expired { .. }
            | InspectError::IssuedInFuture { .. } => {
                let raw = raw.unwrap_or_default();
                Self::new(ErrorCode::InvalidToken).with_details(json!({
                    "token_preview": token_preview(raw),
                    "token_parts": segment_count(raw),
                    "reason": err.to_string(),
                }))
            }
            InspectError::Internal(cause) => Self::internal(cause, verbose),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.code.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            tracing::error!(error_code = %self.code, status_code = %status_code, "request failed");
        } else {
            tracing::debug!(
                error_code = %self.code,
                status_code = %status_code,
                "request rejected"
            );
        }

        let body = ApiErrorResponse::new(self.code, self.message, self.details);
        (status_code, Json(body)).into_response()
    }
}

/// Render a caught handler panic as an internal error response
pub fn panic_response(panic: Box<dyn Any + Send + 'static>, verbose: bool) -> Response {
    let cause = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!(panic = %cause, "handler panicked");
    ApiError::internal(cause, verbose).into_response()
}
