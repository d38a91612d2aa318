//! HTTP request handlers
//!
//! This module contains all the HTTP endpoint handlers organized by functionality.

pub mod api;
pub mod health;
pub mod validate;

// Re-export handlers for convenience
pub use api::{api_health, api_root, hello, test_json};
pub use health::health_check;
pub use validate::validate_token;
