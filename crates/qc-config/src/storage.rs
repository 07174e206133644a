//! Credential and session-projection storage configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_keyring_service() -> String {
    "qcon".to_string()
}

/// Where the credential pair lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenBackend {
    /// OS keychain, falling back to the credentials file.
    #[default]
    Keyring,
    /// `<state_dir>/credentials.json` only.
    File,
    /// Process memory; nothing survives exit.
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: TokenBackend,

    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,

    /// Directory for the credentials file and the session projection.
    /// Empty = `<data dir>/qcon`.
    #[serde(default)]
    pub state_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: TokenBackend::default(),
            keyring_service: default_keyring_service(),
            state_dir: String::new(),
        }
    }
}

impl StorageConfig {
    /// Resolve the state directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] when `state_dir` is empty and
    /// the platform has no data directory.
    pub fn resolve_state_dir(&self) -> Result<PathBuf, ConfigError> {
        let explicit = self.state_dir.trim();
        if !explicit.is_empty() {
            return Ok(PathBuf::from(explicit));
        }
        dirs::data_dir()
            .map(|dir| dir.join("qcon"))
            .ok_or(ConfigError::NotConfigured {
                section: "storage",
                hint: "QCON_STORAGE__STATE_DIR",
            })
    }
}
