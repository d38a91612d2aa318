use clap::{Parser, Subcommand};
use tokenlens_http::runtime::{ConfigError, ServeError};

mod inspect;
mod serve;

use inspect::{InspectArgs, run_inspect};
use serve::{ServeArgs, run_serve};

#[derive(Parser, Debug)]
#[command(name = "tokenlens", version)]
#[command(about = "Tokenlens - bearer token inspection server and tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the validation server (default 127.0.0.1:8888)
    Serve(ServeArgs),
    /// Inspect a token offline and print the result as JSON
    Inspect(InspectArgs),
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Serve(#[from] ServeError),

    #[error("failed to start async runtime: {0}")]
    Runtime(std::io::Error),

    #[error("failed to render output: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() {
    // Initialize JSON logging once.
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();
    let env_filter = match "info".parse() {
        Ok(directive) => env_filter.add_directive(directive),
        Err(_) => env_filter,
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .json()
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            if let Err(e) = run_serve(&args) {
                tracing::error!(error = %e, "Server failed");
                std::process::exit(1);
            }
        }
        Commands::Inspect(args) => match run_inspect(&args) {
            Ok(true) => {}
            Ok(false) => std::process::exit(1),
            Err(e) => {
                tracing::error!(error = %e, "Inspection failed");
                std::process::exit(2);
            }
        },
    }
}
