//! # Environment-Based Configuration
//!
//! Runtime configuration for the HTTP server, loadable from environment
//! variables so a deployment can change behavior without a rebuild.
//!
//! ## Environment Variables
//!
//! ### Token Inspection
//! - `TOKENLENS_EXPECTED_ISSUER` - Expected `iss` claim; mismatches are logged
//!   (default: `https://dev-4xxb1z18b3z4hc6s.us.auth0.com/`)
//! - `TOKENLENS_CLOCK_SKEW_SECS` - Allowed forward-dating of `iat` in seconds
//!   (default: 60, max: 3600)
//!
//! ### HTTP Runtime
//! - `TOKENLENS_ENABLE_CORS` - Permissive CORS headers (default: true)
//! - `TOKENLENS_VERBOSE_ERRORS` - Include the underlying error text in 500
//!   responses (default: false)
//! - `TOKENLENS_MAX_BODY_SIZE` - Maximum request body size in bytes
//!   (default: 1048576 / 1MB, max: 16MB)
//! - `TOKENLENS_HOST` - Bind host (default: 127.0.0.1)
//! - `TOKENLENS_PORT` - Bind port (default: 8888)

use std::env;

use tokenlens_core::{DEFAULT_CLOCK_SKEW_SECS, DEFAULT_EXPECTED_ISSUER, InspectorConfig};

pub const ENV_EXPECTED_ISSUER: &str = "TOKENLENS_EXPECTED_ISSUER";
pub const ENV_CLOCK_SKEW_SECS: &str = "TOKENLENS_CLOCK_SKEW_SECS";
pub const ENV_ENABLE_CORS: &str = "TOKENLENS_ENABLE_CORS";
pub const ENV_VERBOSE_ERRORS: &str = "TOKENLENS_VERBOSE_ERRORS";
pub const ENV_MAX_BODY_SIZE: &str = "TOKENLENS_MAX_BODY_SIZE";
pub const ENV_HOST: &str = "TOKENLENS_HOST";
pub const ENV_PORT: &str = "TOKENLENS_PORT";

/// Every environment variable read by [`HttpRuntimeConfigBuilder::from_env`]
pub const ENV_VARS: [&str; 7] = [
    ENV_EXPECTED_ISSUER,
    ENV_CLOCK_SKEW_SECS,
    ENV_ENABLE_CORS,
    ENV_VERBOSE_ERRORS,
    ENV_MAX_BODY_SIZE,
    ENV_HOST,
    ENV_PORT,
];

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8888;
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024; // 1MB
const MAX_BODY_SIZE_LIMIT: usize = 16 * 1024 * 1024;
const MAX_CLOCK_SKEW_SECS: u64 = 3600;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid environment variable '{key}': {message}")]
    InvalidEnvVar { key: String, message: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// HTTP runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRuntimeConfig {
    /// Issuer tokens are expected to come from
    pub expected_issuer: String,
    /// Allowed forward-dating of `iat`, in seconds
    pub clock_skew_secs: u64,
    /// Enable CORS for cross-origin requests
    pub enable_cors: bool,
    /// Expose the underlying error text in internal error responses
    pub verbose_errors: bool,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    pub host: String,
    pub port: u16,
}

impl Default for HttpRuntimeConfig {
    fn default() -> Self {
        Self {
            expected_issuer: DEFAULT_EXPECTED_ISSUER.to_string(),
            clock_skew_secs: DEFAULT_CLOCK_SKEW_SECS.unsigned_abs(),
            enable_cors: true,
            verbose_errors: false,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl HttpRuntimeConfig {
    /// `host:port` string suitable for `TcpListener::bind`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Inspector settings derived from this configuration
    pub fn inspector_config(&self) -> InspectorConfig {
        let skew = i64::try_from(self.clock_skew_secs).unwrap_or(i64::MAX);
        InspectorConfig::new(self.expected_issuer.clone()).with_clock_skew(skew)
    }
}

/// Builder for `HttpRuntimeConfig` with environment variable support
#[derive(Debug, Clone, Default)]
pub struct HttpRuntimeConfigBuilder {
    config: HttpRuntimeConfig,
}

impl HttpRuntimeConfigBuilder {
    /// Create a new builder with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if any environment variable has a
    /// value that cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = Self::default();

        // Token inspection
        if let Some(issuer) = get_env_string(ENV_EXPECTED_ISSUER) {
            builder = builder.expected_issuer(issuer);
        }
        if let Some(skew) = get_env_u64(ENV_CLOCK_SKEW_SECS)? {
            builder = builder.clock_skew_secs(skew);
        }

        // HTTP runtime
        if let Some(cors) = get_env_bool(ENV_ENABLE_CORS)? {
            builder = builder.enable_cors(cors);
        }
        if let Some(verbose) = get_env_bool(ENV_VERBOSE_ERRORS)? {
            builder = builder.verbose_errors(verbose);
        }
        if let Some(max_size) = get_env_usize(ENV_MAX_BODY_SIZE)? {
            builder = builder.max_body_size(max_size);
        }
        if let Some(host) = get_env_string(ENV_HOST) {
            builder = builder.host(host);
        }
        if let Some(port) = get_env_u16(ENV_PORT)? {
            builder = builder.port(port);
        }

        Ok(builder)
    }

    #[must_use]
    pub fn expected_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.config.expected_issuer = issuer.into();
        self
    }

    /// Set the allowed forward-dating of `iat` in seconds
    #[must_use]
    pub fn clock_skew_secs(mut self, secs: u64) -> Self {
        self.config.clock_skew_secs = secs;
        self
    }

    /// Enable or disable CORS
    #[must_use]
    pub fn enable_cors(mut self, enable: bool) -> Self {
        self.config.enable_cors = enable;
        self
    }

    #[must_use]
    pub fn verbose_errors(mut self, verbose: bool) -> Self {
        self.config.verbose_errors = verbose;
        self
    }

    /// Set maximum request body size in bytes
    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Validate configuration and build `HttpRuntimeConfig`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if the configuration is invalid.
    pub fn build(self) -> Result<HttpRuntimeConfig, ConfigError> {
        self.validate()?;
        Ok(self.config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let config = &self.config;

        if config.expected_issuer.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "expected_issuer cannot be empty".to_string(),
            ));
        }

        if config.clock_skew_secs > MAX_CLOCK_SKEW_SECS {
            return Err(ConfigError::ValidationError(format!(
                "clock_skew_secs must be <= {MAX_CLOCK_SKEW_SECS}"
            )));
        }

        if config.max_body_size == 0 {
            return Err(ConfigError::ValidationError(
                "max_body_size must be greater than 0".to_string(),
            ));
        }
        if config.max_body_size > MAX_BODY_SIZE_LIMIT {
            return Err(ConfigError::ValidationError(
                "max_body_size must be <= 16MB".to_string(),
            ));
        }

        if config.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "host cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

// Environment variable helper functions

fn get_env_string(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn get_env_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    match env::var(key) {
        Ok(val) => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!(
                    "invalid boolean value '{val}', expected true/false/1/0/yes/no/on/off"
                ),
            }),
        },
        Err(_) => Ok(None),
    }
}

fn get_env_parsed<T>(key: &str, type_name: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!("invalid {type_name} value '{val}': {e}"),
            }),
        Err(_) => Ok(None),
    }
}

fn get_env_u64(key: &str) -> Result<Option<u64>, ConfigError> {
    get_env_parsed(key, "u64")
}

fn get_env_usize(key: &str) -> Result<Option<usize>, ConfigError> {
    get_env_parsed(key, "usize")
}

fn get_env_u16(key: &str) -> Result<Option<u16>, ConfigError> {
    get_env_parsed(key, "u16")
}
