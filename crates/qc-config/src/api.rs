//! Backend API configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the platform API, e.g. `https://api.example.com/api/v1`.
    #[serde(default)]
    pub base_url: String,

    /// Per-request timeout applied by the HTTP client.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty()
    }

    /// The base URL without a trailing slash.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] when no base URL is set, and
    /// [`ConfigError::InvalidValue`] when it is not an http(s) URL.
    pub fn require_base_url(&self) -> Result<&str, ConfigError> {
        let url = self.base_url.trim().trim_end_matches('/');
        if url.is_empty() {
            return Err(ConfigError::NotConfigured {
                section: "api",
                hint: "QCON_API__BASE_URL",
            });
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".into(),
                reason: format!("'{url}' must start with http:// or https://"),
            });
        }
        Ok(url)
    }
}
