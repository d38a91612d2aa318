//! # Tokenlens HTTP Runtime
//!
//! Axum runtime exposing the tokenlens token inspector over HTTP.
//!
//! ## Endpoints
//!
//! - **Validation**: `/.netlify/functions/validate-token` and
//!   `/api/validate-token`, GET or POST, token taken from the JSON body,
//!   the `token` query parameter or a bearer `Authorization` header
//! - **Health**: `/health` and `/api/health`
//! - **Diagnostics**: `/api`, `/api/hello`, `/api/test-json`
//!
//! Every response carries an `x-request-id` header and the JSON bodies use a
//! common success/error envelope.

pub mod runtime;

// Re-export main types for public API
pub use runtime::*;
