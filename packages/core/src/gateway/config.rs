//! Gateway Configuration

use crate::gateway::GatewayError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const API_URL_ENV: &str = "CRIPT_API_URL";
pub const API_TOKEN_ENV: &str = "CRIPT_API_TOKEN";
pub const TIMEOUT_ENV: &str = "CRIPT_TIMEOUT_SECS";

/// Connection settings for the CRIPT REST API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayConfig {
    /// API root, e.g. `https://criptapp.org/api`; trailing `/` is trimmed
    pub base_url: String,

    /// Raw API token sent as the `Authorization` header
    #[serde(skip_serializing, default)]
    pub token: String,

    /// Whole-request timeout
    pub timeout_secs: u64,

    pub connect_timeout_secs: u64,

    /// Vocabulary table path relative to `base_url`
    pub vocabulary_path: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://criptapp.org/api".to_string(),
            token: String::new(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            vocabulary_path: "keys/".to_string(),
        }
    }
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `CRIPT_API_URL`, `CRIPT_API_TOKEN` and
    /// `CRIPT_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, GatewayError> {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.base_url = url;
        }
        if let Ok(token) = std::env::var(API_TOKEN_ENV) {
            config.token = token;
        }
        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            config.timeout_secs = raw.parse().map_err(|_| {
                GatewayError::config(format!("{TIMEOUT_ENV} must be a whole number, got '{raw}'"))
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Base URL without trailing slashes
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), GatewayError> {
        let parsed = url::Url::parse(self.normalized_base_url())
            .map_err(|e| GatewayError::config(format!("base_url is not a valid URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(GatewayError::config("base_url must use http or https"));
        }
        if self.token.trim().is_empty() {
            return Err(GatewayError::config("token cannot be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(GatewayError::config("timeout_secs must be greater than 0"));
        }
        Ok(())
    }
}
