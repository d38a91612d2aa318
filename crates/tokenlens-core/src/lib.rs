//! # Tokenlens Core
//!
//! Bearer token extraction and shallow claims inspection.
//!
//! A token is pulled from the first non-empty request source (JSON body,
//! query parameter, `Authorization` header), classified by segment count and,
//! when signed, its payload is decoded and checked against `exp` and `iat`.
//!
//! **No signature is ever verified.** Encrypted tokens are accepted on shape
//! alone and reported with placeholder claims. Treat a successful inspection
//! as "well-formed and not stale", never as "authentic".

pub mod claims;
pub mod clock;
pub mod config;
pub mod error;
pub mod inspector;
pub mod shape;
pub mod sources;

pub use claims::{Audience, TokenClaims, TokenSummary};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{DEFAULT_CLOCK_SKEW_SECS, DEFAULT_EXPECTED_ISSUER, InspectorConfig};
pub use error::{ErrorCode, InspectError};
pub use inspector::{InspectedToken, Inspector, token_preview, validate_token};
pub use shape::{TokenShape, segment_count};
pub use sources::{RequestTokenSources, TokenSource, bearer_token};
