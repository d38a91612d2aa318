//! The token validation pipeline
//!
//! [`validate_token`] is a pure function of the raw token, the
//! configuration and the current time. [`Inspector`] bundles it with a
//! [`Clock`] for callers that want wall-clock validation.
//!
//! # Trust model
//!
//! Signatures are never verified. A signed token passes when its
//! self-asserted payload is well-formed and its temporal claims hold, and an
//! encrypted token passes on shape alone. Do not base authorization
//! decisions on the result without adding real verification upstream.

use std::sync::Arc;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::claims::{TokenClaims, TokenSummary};
use crate::clock::{Clock, SystemClock};
use crate::config::InspectorConfig;
use crate::error::InspectError;
use crate::shape::{SIGNED_SEGMENTS, TokenShape};
use crate::sources::{RequestTokenSources, TokenSource};

/// URL-safe base64 that accepts both padded and unpadded input
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Characters of a token shown in previews
pub const PREVIEW_CHARS: usize = 20;

/// A token that passed inspection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectedToken {
    pub shape: TokenShape,
    pub claims: TokenClaims,
    /// True when `claims` are the placeholder used for encrypted tokens
    pub synthetic: bool,
}

impl InspectedToken {
    pub fn summary(&self) -> TokenSummary {
        TokenSummary::from(&self.claims)
    }
}

/// Classify, decode and check a raw token at time `now`
///
/// # Errors
///
/// - [`InspectError::EmptyToken`] for blank input
/// - [`InspectError::MalformedToken`] for a segment count other than 3 or 5,
///   or a payload that is not base64url-encoded JSON claims
/// - [`InspectError::Expired`] when `exp < now`
/// - [`InspectError::IssuedInFuture`] when `iat` exceeds `now` plus the
///   configured skew
pub fn validate_token(
    raw: &str,
    config: &InspectorConfig,
    now: i64,
) -> Result<InspectedToken, InspectError> {
    if raw.trim().is_empty() {
        return Err(InspectError::EmptyToken);
    }

    match TokenShape::classify(raw) {
        TokenShape::Encrypted => {
            debug!("encrypted token detected, accepting without inspection");
            Ok(InspectedToken {
                shape: TokenShape::Encrypted,
                claims: TokenClaims::synthetic(now),
                synthetic: true,
            })
        }
        TokenShape::Malformed { segment_count } => Err(InspectError::malformed(
            segment_count,
            format!("expected 3 or 5 segments, got {segment_count}"),
        )),
        TokenShape::Signed => {
            let claims = decode_claims(raw)?;
            check_temporal_claims(&claims, config, now)?;
            check_issuer(&claims, config);
            Ok(InspectedToken {
                shape: TokenShape::Signed,
                claims,
                synthetic: false,
            })
        }
    }
}

/// Decode the unverified payload segment of a signed token
fn decode_claims(raw: &str) -> Result<TokenClaims, InspectError> {
    let payload = raw
        .split('.')
        .nth(1)
        .ok_or_else(|| InspectError::Internal("signed token has no payload segment".into()))?;

    let bytes = PAYLOAD_ENGINE.decode(payload).map_err(|e| {
        InspectError::malformed(SIGNED_SEGMENTS, format!("payload is not base64url: {e}"))
    })?;

    let value: Value = serde_json::from_slice(&bytes).map_err(|e| {
        InspectError::malformed(SIGNED_SEGMENTS, format!("payload is not JSON: {e}"))
    })?;

    if !value.is_object() {
        return Err(InspectError::malformed(
            SIGNED_SEGMENTS,
            "payload is not a JSON object",
        ));
    }

    serde_json::from_value(value).map_err(|e| {
        InspectError::malformed(SIGNED_SEGMENTS, format!("unexpected claim type: {e}"))
    })
}

fn check_temporal_claims(
    claims: &TokenClaims,
    config: &InspectorConfig,
    now: i64,
) -> Result<(), InspectError> {
    if let Some(exp) = claims.exp
        && exp < now
    {
        return Err(InspectError::Expired { exp, now });
    }

    if let Some(iat) = claims.iat
        && iat > now.saturating_add(config.clock_skew_tolerance_secs)
    {
        return Err(InspectError::IssuedInFuture { iat, now });
    }

    Ok(())
}

/// Issuer mismatch is reported, not enforced
fn check_issuer(claims: &TokenClaims, config: &InspectorConfig) {
    if let Some(iss) = claims.iss.as_deref()
        && iss != config.expected_issuer
    {
        warn!(
            issuer = %iss,
            expected = %config.expected_issuer,
            "token issuer does not match expected issuer"
        );
    }
}

/// First [`PREVIEW_CHARS`] characters of a token followed by `...`
pub fn token_preview(raw: &str) -> String {
    let head: String = raw.chars().take(PREVIEW_CHARS).collect();
    format!("{head}...")
}

/// Token validation bound to a configuration and a clock
#[derive(Debug, Clone)]
pub struct Inspector {
    config: InspectorConfig,
    clock: Arc<dyn Clock>,
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new(InspectorConfig::default())
    }
}

impl Inspector {
    /// Inspector reading the wall clock
    pub fn new(config: InspectorConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: InspectorConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    pub fn now(&self) -> i64 {
        self.clock.now_unix()
    }

    /// Validate a raw token at the current time
    ///
    /// # Errors
    ///
    /// See [`validate_token`].
    pub fn inspect(&self, raw: &str) -> Result<InspectedToken, InspectError> {
        validate_token(raw, &self.config, self.now())
    }

    /// Extract a token from request sources and validate it
    ///
    /// # Errors
    ///
    /// [`InspectError::MissingToken`] when no source holds a token, otherwise
    /// see [`validate_token`].
    pub fn inspect_sources(
        &self,
        sources: &RequestTokenSources,
    ) -> Result<(InspectedToken, TokenSource), InspectError> {
        let (raw, source) = sources.extract().ok_or(InspectError::MissingToken)?;
        let inspected = self.inspect(raw)?;
        Ok((inspected, source))
    }
}
