//! `tokenlens inspect` - offline token inspection

use std::env;

use clap::Args;
use serde_json::Value;
use tokenlens_core::{InspectError, Inspector};
use tokenlens_http::runtime::{ApiError, ApiErrorResponse, ApiResponse, HttpRuntimeConfigBuilder};

use crate::CliError;

#[derive(Args, Debug, Default)]
pub struct InspectArgs {
    /// Token to inspect
    pub token: Option<String>,
    /// Read the token from this environment variable instead
    #[arg(long, value_name = "VAR")]
    pub token_env: Option<String>,
    /// Expected issuer (overrides TOKENLENS_EXPECTED_ISSUER)
    #[arg(long)]
    pub issuer: Option<String>,
}

impl InspectArgs {
    /// The positional token, falling back to the named environment variable
    fn resolve_token(&self) -> Option<String> {
        self.token.clone().or_else(|| {
            self.token_env
                .as_deref()
                .and_then(|var| env::var(var).ok())
        })
    }
}

/// Outcome of an inspection rendered the way the HTTP endpoint would
#[derive(Debug)]
pub struct InspectOutcome {
    pub valid: bool,
    pub body: Value,
}

/// Run the inspection and print the resulting envelope
///
/// Returns whether the token was accepted.
pub fn run_inspect(args: &InspectArgs) -> Result<bool, CliError> {
    let mut builder = HttpRuntimeConfigBuilder::from_env()?;
    if let Some(issuer) = &args.issuer {
        builder = builder.expected_issuer(issuer.clone());
    }
    let config = builder.build()?;

    let inspector = Inspector::new(config.inspector_config());
    let token = args.resolve_token();
    let outcome = inspect_token(&inspector, token.as_deref(), config.verbose_errors)?;

    let rendered = serde_json::to_string_pretty(&outcome.body)?;
    println!("{rendered}");
    Ok(outcome.valid)
}

pub fn inspect_token(
    inspector: &Inspector,
    token: Option<&str>,
    verbose: bool,
) -> Result<InspectOutcome, serde_json::Error> {
    let result = match token {
        Some(raw) => inspector.inspect(raw),
        None => Err(InspectError::MissingToken),
    };

    let outcome = match result {
        Ok(inspected) => {
            let user = inspected.claims.display_user().unwrap_or("unknown");
            tracing::debug!(shape = inspected.shape.as_str(), "token accepted");
            let response = ApiResponse::new(inspected.summary())
                .with_message(format!("Token validated successfully for user: {user}"));
            InspectOutcome {
                valid: true,
                body: serde_json::to_value(response)?,
            }
        }
        Err(err) => {
            tracing::warn!(error_code = %err.code(), reason = %err, "token rejected");
            let error = ApiError::from_inspect_error(&err, token, "CLI", verbose);
            let response = ApiErrorResponse::new(error.code, error.message, error.details);
            InspectOutcome {
                valid: false,
                body: serde_json::to_value(response)?,
            }
        }
    };

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use serial_test::serial;
    use std::sync::Arc;
    use tokenlens_core::{FixedClock, InspectorConfig};

    const NOW: i64 = 1_700_000_000;

    fn inspector() -> Inspector {
        Inspector::with_clock(InspectorConfig::default(), Arc::new(FixedClock(NOW)))
    }

    #[test]
    fn test_inspect_valid_token() {
        let payload = URL_SAFE_NO_PAD.encode(r#"{"sub":"u1","exp":1700003600}"#);
        let token = format!("h.{payload}.s");
        let outcome = inspect_token(&inspector(), Some(&token), false).unwrap();
        assert!(outcome.valid);
        assert_eq!(outcome.body["payload"]["userId"], "u1");
    }

    #[test]
    fn test_inspect_without_token_is_missing() {
        let outcome = inspect_token(&inspector(), None, false).unwrap();
        assert!(!outcome.valid);
        assert_eq!(outcome.body["error"]["code"], "MISSING_TOKEN");
        assert_eq!(outcome.body["error"]["details"]["received_method"], "CLI");
    }

    #[test]
    fn test_inspect_malformed_token() {
        let outcome = inspect_token(&inspector(), Some("abc.def"), false).unwrap();
        assert!(!outcome.valid);
        assert_eq!(outcome.body["error"]["statusCode"], 401);
    }

    #[test]
    #[serial]
    fn test_token_read_from_env_var() {
        unsafe {
            env::set_var("TOKENLENS_TEST_TOKEN", "a.b.c.d.e");
        }
        let args = InspectArgs {
            token_env: Some("TOKENLENS_TEST_TOKEN".into()),
            ..Default::default()
        };
        assert_eq!(args.resolve_token().as_deref(), Some("a.b.c.d.e"));

        let args = InspectArgs {
            token: Some("x.y.z".into()),
            token_env: Some("TOKENLENS_TEST_TOKEN".into()),
            ..Default::default()
        };
        assert_eq!(args.resolve_token().as_deref(), Some("x.y.z"));

        unsafe {
            env::remove_var("TOKENLENS_TEST_TOKEN");
        }
    }
}
