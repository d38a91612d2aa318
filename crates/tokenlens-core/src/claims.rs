//! Token claims and the client-facing claims summary

use serde::{Deserialize, Deserializer, Serialize};

/// Subject reported for encrypted tokens
pub const SYNTHETIC_SUBJECT: &str = "encrypted-user";
/// Email reported for encrypted tokens
pub const SYNTHETIC_EMAIL: &str = "encrypted@auth0.com";
/// Display name reported for encrypted tokens
pub const SYNTHETIC_NAME: &str = "Encrypted User";
/// Issuer reported for encrypted tokens
pub const SYNTHETIC_ISSUER: &str = "https://dev-4xxb1z18b3z4hc6s.us.auth0.com/";
/// Lifetime given to synthetic claims, in seconds
pub const SYNTHETIC_LIFETIME_SECS: i64 = 3600;

/// The `aud` claim: a single audience or a list of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    /// The audience to report; the first entry when a list
    pub fn primary(&self) -> Option<&str> {
        match self {
            Self::One(aud) => Some(aud),
            Self::Many(list) => list.first().map(String::as_str),
        }
    }
}

/// Claims decoded from the payload segment of a signed token
///
/// The payload is self-asserted: nothing here has been cryptographically
/// verified. Unknown claims are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user identifier); numeric subjects are kept as their decimal text
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Space-separated scopes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Issued at (Unix seconds)
    #[serde(
        default,
        deserialize_with = "numeric_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub iat: Option<i64>,
    /// Expiration time (Unix seconds)
    #[serde(
        default,
        deserialize_with = "numeric_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// A NumericDate as it may appear on the wire
#[derive(Deserialize)]
#[serde(untagged)]
enum NumericDate {
    Whole(i64),
    Fractional(f64),
}

/// Accept integral or fractional seconds, flooring the latter
fn numeric_date<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<NumericDate>::deserialize(deserializer)?.map(|date| match date {
            NumericDate::Whole(secs) => secs,
            // `as` saturates at the i64 bounds
            NumericDate::Fractional(secs) => secs.floor() as i64,
        }),
    )
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Number(serde_json::Number),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|value| match value {
            StringOrNumber::Text(text) => text,
            StringOrNumber::Number(number) => number.to_string(),
        }),
    )
}

impl TokenClaims {
    /// Placeholder claims substituted for an encrypted token
    ///
    /// Encrypted tokens are accepted without decryption; these claims only
    /// signal that fact to the caller.
    pub fn synthetic(now: i64) -> Self {
        Self {
            sub: Some(SYNTHETIC_SUBJECT.to_string()),
            email: Some(SYNTHETIC_EMAIL.to_string()),
            name: Some(SYNTHETIC_NAME.to_string()),
            scope: None,
            iat: Some(now),
            exp: Some(now.saturating_add(SYNTHETIC_LIFETIME_SECS)),
            aud: None,
            iss: Some(SYNTHETIC_ISSUER.to_string()),
        }
    }

    /// Scopes split on whitespace, if a scope claim is present
    pub fn scopes(&self) -> Option<Vec<String>> {
        self.scope
            .as_ref()
            .map(|s| s.split_whitespace().map(str::to_string).collect())
    }

    /// Best label for log lines and messages: email, then subject
    pub fn display_user(&self) -> Option<&str> {
        self.email.as_deref().or(self.sub.as_deref())
    }
}

/// Normalized claims returned to clients on successful validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSummary {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl From<&TokenClaims> for TokenSummary {
    fn from(claims: &TokenClaims) -> Self {
        Self {
            valid: true,
            user_id: claims.sub.clone(),
            email: claims.email.clone(),
            name: claims.name.clone(),
            scope: claims.scopes(),
            iat: claims.iat,
            exp: claims.exp,
            aud: claims
                .aud
                .as_ref()
                .and_then(Audience::primary)
                .map(str::to_string),
            iss: claims.iss.clone(),
        }
    }
}
