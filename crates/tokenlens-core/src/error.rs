//! Error taxonomy for token inspection
//!
//! Every failure of the inspection pipeline is one of the [`InspectError`]
//! variants. None of them are fatal: callers turn them into structured
//! responses via [`InspectError::code`] and [`InspectError::status_code`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a candidate token was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InspectError {
    /// No source supplied a token
    #[error("no token provided")]
    MissingToken,

    /// The token was empty or contained only whitespace
    #[error("token is empty")]
    EmptyToken,

    /// Wrong segment count, or a payload that does not decode into claims
    #[error("malformed token ({segment_count} segments): {reason}")]
    MalformedToken {
        /// Number of dot-separated segments in the raw token
        segment_count: usize,
        /// What went wrong while decoding
        reason: String,
    },

    /// The `exp` claim lies in the past
    #[error("token expired at {exp} (now {now})")]
    Expired { exp: i64, now: i64 },

    /// The `iat` claim lies beyond the clock-skew tolerance
    #[error("token issued in the future at {iat} (now {now})")]
    IssuedInFuture { iat: i64, now: i64 },

    /// Anything the pipeline did not anticipate
    #[error("internal inspection error: {0}")]
    Internal(String),
}

impl InspectError {
    /// Create a `MalformedToken` error
    pub fn malformed(segment_count: usize, reason: impl Into<String>) -> Self {
        Self::MalformedToken {
            segment_count,
            reason: reason.into(),
        }
    }

    /// Machine-readable code reported to clients
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingToken => ErrorCode::MissingToken,
            Self::EmptyToken => ErrorCode::EmptyToken,
            Self::MalformedToken { .. } | Self::Expired { .. } | Self::IssuedInFuture { .. } => {
                ErrorCode::InvalidToken
            }
            Self::Internal(_) => ErrorCode::InternalServerError,
        }
    }

    /// HTTP status code this error maps to
    pub fn status_code(&self) -> u16 {
        self.code().status_code()
    }

    /// Whether the caller (rather than the service) is at fault
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }
}

/// Type-safe error codes for inspection failures
///
/// Serialized in SCREAMING_SNAKE_CASE, which is the wire format the
/// frontend expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No token in body, query or header
    MissingToken,
    /// Token present but blank
    EmptyToken,
    /// Token malformed, expired or issued in the future
    InvalidToken,
    /// Unexpected failure
    InternalServerError,
}

impl ErrorCode {
    /// Get the wire representation of this code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingToken => "MISSING_TOKEN",
            Self::EmptyToken => "EMPTY_TOKEN",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }

    /// HTTP status code for this error code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingToken | Self::EmptyToken => 400,
            Self::InvalidToken => 401,
            Self::InternalServerError => 500,
        }
    }

    /// Default human-readable message for this code
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::MissingToken => {
                "Token is required. Provide via POST body, query parameter, or Authorization header"
            }
            Self::EmptyToken => "Token cannot be empty",
            Self::InvalidToken => "Token is invalid, expired, or malformed",
            Self::InternalServerError => "An unexpected error occurred during token validation",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_statuses() {
        assert_eq!(InspectError::MissingToken.code(), ErrorCode::MissingToken);
        assert_eq!(InspectError::MissingToken.status_code(), 400);
        assert_eq!(InspectError::EmptyToken.status_code(), 400);
        assert_eq!(
            InspectError::malformed(2, "bad").code(),
            ErrorCode::InvalidToken
        );
        assert_eq!(InspectError::Expired { exp: 1, now: 2 }.status_code(), 401);
        assert_eq!(
            InspectError::IssuedInFuture { iat: 100, now: 1 }.status_code(),
            401
        );
        assert_eq!(InspectError::Internal("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_error_code_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorCode::InternalServerError).unwrap();
        assert_eq!(json, "\"INTERNAL_SERVER_ERROR\"");
        assert_eq!(ErrorCode::EmptyToken.to_string(), "EMPTY_TOKEN");
    }

    #[test]
    fn test_malformed_display_includes_segment_count() {
        let err = InspectError::malformed(2, "expected 3 or 5 segments");
        assert_eq!(
            err.to_string(),
            "malformed token (2 segments): expected 3 or 5 segments"
        );
    }

    #[test]
    fn test_is_client_error() {
        assert!(InspectError::Expired { exp: 0, now: 1 }.is_client_error());
        assert!(!InspectError::Internal("x".into()).is_client_error());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<InspectError>();
    }
}
