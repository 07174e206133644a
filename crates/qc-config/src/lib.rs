//! # qc-config
//!
//! Layered configuration loading for the console using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`QCON_*` prefix, `__` as separator)
//! 2. Project-level `.qcon/config.toml`
//! 3. User-level `~/.config/qcon/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `QCON_API__BASE_URL` -> `api.base_url`,
//! `QCON_STORAGE__BACKEND` -> `storage.backend`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use qc_config::ConsoleConfig;
//!
//! let config = ConsoleConfig::load_with_dotenv().expect("config");
//! if config.api.is_configured() {
//!     println!("API: {}", config.api.base_url);
//! }
//! ```

mod api;
mod error;
mod general;
mod oauth;
mod storage;

pub use api::ApiConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use oauth::OAuthConfig;
pub use storage::{StorageConfig, TokenBackend};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_PREFIX: &str = "QCON_";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub oauth: OAuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl ConsoleConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source fails to parse or a value
    /// has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or layer providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".qcon/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("qcon").join("config.toml"))
    }
}
