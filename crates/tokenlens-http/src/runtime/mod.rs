//! # Runtime Module
//!
//! HTTP runtime for the token inspector. [`HttpInspectorRuntime`] owns the
//! shared [`Inspector`](tokenlens_core::Inspector) and runtime configuration
//! and turns them into an Axum [`Router`](axum::Router).
//!
//! ## Usage Pattern
//!
//! ```no_run
//! use tokenlens_http::runtime::{HttpInspectorRuntime, HttpRuntimeConfigBuilder, serve};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HttpRuntimeConfigBuilder::from_env()?.build()?;
//!     serve(HttpInspectorRuntime::new(config)).await?;
//!     Ok(())
//! }
//! ```

/// Environment-driven runtime configuration.
pub mod config;
/// Success and error response envelopes.
pub mod envelope;
/// HTTP error mapping and request ID middleware.
pub mod error;
/// HTTP request handlers organized by functionality.
pub mod handlers;
/// HTTP router configuration and route registration.
pub mod router;
/// Listener binding and the serve loop.
pub mod server;
/// Graceful shutdown signal handling.
pub mod shutdown;

use std::sync::Arc;

use tokenlens_core::Inspector;

pub use config::{ConfigError, HttpRuntimeConfig, HttpRuntimeConfigBuilder};
pub use envelope::{ApiErrorBody, ApiErrorResponse, ApiResponse};
pub use error::{ApiError, RequestId, RequestIdExtension, request_id_middleware};
pub use server::{ServeError, serve, serve_with_listener};
pub use shutdown::shutdown_signal;

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct HttpInspectorRuntime {
    pub inspector: Arc<Inspector>,
    pub config: Arc<HttpRuntimeConfig>,
}

impl HttpInspectorRuntime {
    /// Runtime with an inspector reading the wall clock
    pub fn new(config: HttpRuntimeConfig) -> Self {
        let inspector = Inspector::new(config.inspector_config());
        Self::with_inspector(config, inspector)
    }

    /// Runtime with a caller-supplied inspector, e.g. one on a fixed clock
    pub fn with_inspector(config: HttpRuntimeConfig, inspector: Inspector) -> Self {
        Self {
            inspector: Arc::new(inspector),
            config: Arc::new(config),
        }
    }
}

impl Default for HttpInspectorRuntime {
    fn default() -> Self {
        Self::new(HttpRuntimeConfig::default())
    }
}
