//! Google OAuth entry point configuration.

use serde::{Deserialize, Serialize};

fn default_platform() -> String {
    "admin".to_string()
}

const fn default_callback_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OAuthConfig {
    /// Redirect target passed to `/auth/google`. Empty = loopback callback.
    #[serde(default)]
    pub redirect_uri: String,

    /// `platform` query parameter passed to `/auth/google`.
    #[serde(default = "default_platform")]
    pub platform: String,

    /// How long the loopback callback server waits for the browser.
    #[serde(default = "default_callback_timeout_secs")]
    pub callback_timeout_secs: u64,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            redirect_uri: String::new(),
            platform: default_platform(),
            callback_timeout_secs: default_callback_timeout_secs(),
        }
    }
}

impl OAuthConfig {
    /// Whether the browser flow should bind a local callback server.
    #[must_use]
    pub fn uses_loopback(&self) -> bool {
        self.redirect_uri.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = OAuthConfig::default();
        assert!(config.uses_loopback());
        assert_eq!(config.platform, "admin");
        assert_eq!(config.callback_timeout_secs, 120);
    }

    #[test]
    fn explicit_redirect_disables_loopback() {
        let config = OAuthConfig {
            redirect_uri: "https://console.example.com/auth/callback".into(),
            ..Default::default()
        };
        assert!(!config.uses_loopback());
    }
}
