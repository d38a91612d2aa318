//! Inspector configuration

/// Issuer the tokens are expected to come from
pub const DEFAULT_EXPECTED_ISSUER: &str = "https://dev-4xxb1z18b3z4hc6s.us.auth0.com/";

/// Allowed forward-dating of `iat`, in seconds
pub const DEFAULT_CLOCK_SKEW_SECS: i64 = 60;

/// Static configuration for token inspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectorConfig {
    /// Expected `iss` claim; a mismatch is logged, never rejected
    pub expected_issuer: String,
    /// How far in the future `iat` may be before the token is rejected
    pub clock_skew_tolerance_secs: i64,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            expected_issuer: DEFAULT_EXPECTED_ISSUER.to_string(),
            clock_skew_tolerance_secs: DEFAULT_CLOCK_SKEW_SECS,
        }
    }
}

impl InspectorConfig {
    pub fn new(expected_issuer: impl Into<String>) -> Self {
        Self {
            expected_issuer: expected_issuer.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_clock_skew(mut self, secs: i64) -> Self {
        self.clock_skew_tolerance_secs = secs;
        self
    }
}
