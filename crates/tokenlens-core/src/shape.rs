//! Token shape classification by segment count

use serde::Serialize;

/// Segment count of an encrypted (JWE) token
pub const ENCRYPTED_SEGMENTS: usize = 5;
/// Segment count of a signed (JWT) token
pub const SIGNED_SEGMENTS: usize = 3;

/// Structural classification of a raw token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TokenShape {
    /// Five segments; treated as opaque
    Encrypted,
    /// Three segments; the payload is inspected
    Signed,
    /// Any other segment count
    Malformed { segment_count: usize },
}

impl TokenShape {
    pub fn classify(raw: &str) -> Self {
        match segment_count(raw) {
            ENCRYPTED_SEGMENTS => Self::Encrypted,
            SIGNED_SEGMENTS => Self::Signed,
            segment_count => Self::Malformed { segment_count },
        }
    }

    pub fn segment_count(&self) -> usize {
        match self {
            Self::Encrypted => ENCRYPTED_SEGMENTS,
            Self::Signed => SIGNED_SEGMENTS,
            Self::Malformed { segment_count } => *segment_count,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Encrypted => "encrypted",
            Self::Signed => "signed",
            Self::Malformed { .. } => "malformed",
        }
    }
}

/// Number of `.`-separated segments, counting empty ones
pub fn segment_count(raw: &str) -> usize {
    raw.split('.').count()
}
