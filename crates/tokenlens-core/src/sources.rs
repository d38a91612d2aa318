//! Token extraction from request sources
//!
//! A request can carry a bearer token in three places. They are tried in a
//! fixed priority order regardless of the HTTP method:
//!
//! 1. `token` field of a JSON body
//! 2. `token` query parameter
//! 3. `Authorization: Bearer <token>` header

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Literal, case-sensitive prefix of a bearer `Authorization` header
pub const BEARER_PREFIX: &str = "Bearer ";

/// Name of the body field and query parameter carrying the token
pub const TOKEN_FIELD: &str = "token";

/// Where an extracted token came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenSource {
    Body,
    Query,
    Header,
}

impl TokenSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Query => "query",
            Self::Header => "header",
        }
    }
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strip the bearer prefix from an `Authorization` header value
///
/// Returns `None` when the header does not start with `"Bearer "`.
pub fn bearer_token(authorization: &str) -> Option<&str> {
    authorization.strip_prefix(BEARER_PREFIX)
}

/// Candidate tokens found in one inbound request
///
/// Built once per request and discarded afterwards. `Debug` output redacts
/// the token values.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RequestTokenSources {
    pub body_token: Option<String>,
    pub query_token: Option<String>,
    pub header_token: Option<String>,
}

impl fmt::Debug for RequestTokenSources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestTokenSources")
            .field("body_token", &self.body_token.as_ref().map(|_| "[REDACTED]"))
            .field("query_token", &self.query_token.as_ref().map(|_| "[REDACTED]"))
            .field("header_token", &self.header_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl RequestTokenSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect sources from a parsed body, query map and header map
    ///
    /// Header names are matched case-insensitively.
    pub fn from_request_parts(
        body: Option<&Value>,
        query: &HashMap<String, String>,
        headers: &HashMap<String, String>,
    ) -> Self {
        let authorization = headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("authorization"))
            .map(|(_, value)| value.as_str());

        Self::new()
            .body_json(body)
            .query_params(query)
            .authorization(authorization)
    }

    /// Take the `token` field of a JSON body, if it is a string
    #[must_use]
    pub fn body_json(mut self, body: Option<&Value>) -> Self {
        self.body_token = body
            .and_then(|b| b.get(TOKEN_FIELD))
            .and_then(Value::as_str)
            .map(str::to_string);
        self
    }

    /// Take the `token` query parameter
    #[must_use]
    pub fn query_params(mut self, query: &HashMap<String, String>) -> Self {
        self.query_token = query.get(TOKEN_FIELD).cloned();
        self
    }

    /// Take the bearer token from an `Authorization` header value
    #[must_use]
    pub fn authorization(mut self, header: Option<&str>) -> Self {
        self.header_token = header.and_then(bearer_token).map(str::to_string);
        self
    }

    #[must_use]
    pub fn with_body_token(mut self, token: impl Into<String>) -> Self {
        self.body_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_query_token(mut self, token: impl Into<String>) -> Self {
        self.query_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_header_token(mut self, token: impl Into<String>) -> Self {
        self.header_token = Some(token.into());
        self
    }

    /// Pick the first non-empty token in priority order
    pub fn extract(&self) -> Option<(&str, TokenSource)> {
        [
            (&self.body_token, TokenSource::Body),
            (&self.query_token, TokenSource::Query),
            (&self.header_token, TokenSource::Header),
        ]
        .into_iter()
        .find_map(|(token, source)| {
            token
                .as_deref()
                .filter(|t| !t.is_empty())
                .map(|t| (t, source))
        })
    }

    /// True when no source holds a non-empty token
    pub fn is_empty(&self) -> bool {
        self.extract().is_none()
    }
}
