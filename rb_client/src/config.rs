//! Client configuration loaded from the environment.

use remote_blackjack::controller::{ConfigError, ControllerConfig, parse_env_or};
use std::{path::PathBuf, time::Duration};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";
pub const DEFAULT_IDENTITY_FILE: &str = ".blackjack_client_uuid";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Game server root, without a trailing slash
    pub server_url: String,

    /// File holding the client id
    pub identity_file: PathBuf,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Pacing delays
    pub controller: ControllerConfig,
}

impl ClientConfig {
    /// Load configuration from environment variables. Command-line values
    /// take precedence.
    pub fn from_env(
        server_override: Option<String>,
        identity_override: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let server_url = server_override
            .or_else(|| std::env::var("RB_SERVER_URL").ok())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        let identity_file = identity_override
            .or_else(|| std::env::var("RB_IDENTITY_FILE").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_IDENTITY_FILE));
        let timeout_secs = parse_env_or("RB_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS);

        let config = Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            identity_file,
            request_timeout: Duration::from_secs(timeout_secs),
            controller: ControllerConfig::from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: "RB_SERVER_URL".to_string(),
                reason: format!("'{}' is not an http(s) URL", self.server_url),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                var: "RB_REQUEST_TIMEOUT_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }
        self.controller.validate()
    }
}
