//! `tokenlens serve` - local validation server

use clap::Args;
use tokenlens_http::runtime::{
    HttpInspectorRuntime, HttpRuntimeConfig, HttpRuntimeConfigBuilder, serve,
};

use crate::CliError;

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Bind host (overrides TOKENLENS_HOST)
    #[arg(long)]
    pub host: Option<String>,
    /// Bind port (overrides TOKENLENS_PORT)
    #[arg(long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    /// Environment configuration with command-line overrides applied
    pub fn config(&self) -> Result<HttpRuntimeConfig, CliError> {
        let mut builder = HttpRuntimeConfigBuilder::from_env()?;
        if let Some(host) = &self.host {
            builder = builder.host(host.clone());
        }
        if let Some(port) = self.port {
            builder = builder.port(port);
        }
        Ok(builder.build()?)
    }
}

pub fn run_serve(args: &ServeArgs) -> Result<(), CliError> {
    let config = args.config()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    runtime.block_on(serve(HttpInspectorRuntime::new(config)))?;
    Ok(())
}
