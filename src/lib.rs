//! # Tokenlens
//!
//! Facade over the tokenlens workspace crates.
//!
//! - [`tokenlens_core`]: token extraction, classification and claims checks
//! - [`tokenlens_http`]: the Axum runtime serving the validation endpoints
//!
//! ```rust
//! use tokenlens_workspace::{InspectError, InspectorConfig, validate_token};
//!
//! let err = validate_token("abc.def", &InspectorConfig::default(), 0).unwrap_err();
//! assert!(matches!(err, InspectError::MalformedToken { segment_count: 2, .. }));
//! ```

pub use tokenlens_core;
pub use tokenlens_http;

pub use tokenlens_core::{
    ErrorCode, InspectError, InspectedToken, Inspector, InspectorConfig, RequestTokenSources,
    TokenClaims, TokenShape, TokenSource, TokenSummary, validate_token,
};
pub use tokenlens_http::runtime::{
    HttpInspectorRuntime, HttpRuntimeConfig, HttpRuntimeConfigBuilder,
};
