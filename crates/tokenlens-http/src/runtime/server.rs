//! Binding and serving the runtime

use std::future::Future;
use std::io;

use tokio::net::TcpListener;
use tracing::info;

use crate::runtime::{
    HttpInspectorRuntime, router::NETLIFY_VALIDATE_PATH, shutdown::shutdown_signal,
};

/// Errors raised while starting or running the server
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Io(#[from] io::Error),
}

/// Bind the configured address and serve until SIGINT or SIGTERM
///
/// # Errors
///
/// Returns [`ServeError::Bind`] when the address cannot be bound and
/// [`ServeError::Io`] when the server fails while running.
pub async fn serve(runtime: HttpInspectorRuntime) -> Result<(), ServeError> {
    let address = runtime.config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| ServeError::Bind { address, source })?;

    serve_with_listener(runtime, listener, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` completes
///
/// # Errors
///
/// Returns [`ServeError::Io`] when the server fails while running.
pub async fn serve_with_listener<F>(
    runtime: HttpInspectorRuntime,
    listener: TcpListener,
    shutdown: F,
) -> Result<(), ServeError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr()?;
    info!(
        address = %local_addr,
        expected_issuer = %runtime.config.expected_issuer,
        cors = runtime.config.enable_cors,
        "tokenlens server listening"
    );
    info!(
        accepts = "body token, ?token=, Authorization: Bearer",
        "validation endpoint: http://{local_addr}{NETLIFY_VALIDATE_PATH}"
    );

    axum::serve(listener, runtime.router())
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("tokenlens server stopped");
    Ok(())
}
