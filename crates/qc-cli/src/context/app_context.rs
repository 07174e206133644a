use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use qc_auth::{
    ApiClient, FileProjectionStore, FileTokenStore, HttpIdentityClient, KeyringTokenStore,
    MemoryProjectionStore, MemoryTokenStore, ProjectionStore, SessionStore, TokenStorage,
};
use qc_config::{ConsoleConfig, TokenBackend};

pub type ConsoleSession = SessionStore<HttpIdentityClient>;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub config: ConsoleConfig,
    pub state_dir: PathBuf,
    pub session: Arc<ConsoleSession>,
    pub api: ApiClient<HttpIdentityClient>,
}

impl AppContext {
    /// Build storage, identity client, session store and transport from config.
    pub fn init(config: ConsoleConfig) -> anyhow::Result<Self> {
        let state_dir = config.storage.resolve_state_dir()?;

        let tokens: Arc<dyn TokenStorage> = match config.storage.backend {
            TokenBackend::Keyring => Arc::new(KeyringTokenStore::new(
                config.storage.keyring_service.clone(),
                FileTokenStore::in_dir(&state_dir),
            )),
            TokenBackend::File => Arc::new(FileTokenStore::in_dir(&state_dir)),
            TokenBackend::Memory => Arc::new(MemoryTokenStore::new()),
        };
        let projection: Arc<dyn ProjectionStore> = match config.storage.backend {
            TokenBackend::Memory => Arc::new(MemoryProjectionStore::new()),
            TokenBackend::Keyring | TokenBackend::File => {
                Arc::new(FileProjectionStore::in_dir(&state_dir))
            }
        };

        Self::from_parts(config, state_dir, tokens, projection)
    }

    /// Assemble a context around explicit storage collaborators.
    pub fn from_parts(
        config: ConsoleConfig,
        state_dir: PathBuf,
        tokens: Arc<dyn TokenStorage>,
        projection: Arc<dyn ProjectionStore>,
    ) -> anyhow::Result<Self> {
        let base_url = config.api.require_base_url()?.to_string();
        let timeout = Duration::from_secs(config.api.timeout_secs);

        let identity = HttpIdentityClient::new(&base_url, timeout)
            .context("failed to build identity client")?;
        let session = Arc::new(SessionStore::new(tokens, identity).with_projection(projection));
        let api = ApiClient::new(&base_url, timeout, Arc::clone(&session))
            .context("failed to build API client")?;

        Ok(Self {
            config,
            state_dir,
            session,
            api,
        })
    }

    pub fn identity(&self) -> &HttpIdentityClient {
        self.session.identity()
    }

    /// Where the access token currently lives, for status output.
    pub fn token_source(&self) -> Option<&'static str> {
        match self.config.storage.backend {
            TokenBackend::Keyring => KeyringTokenStore::new(
                self.config.storage.keyring_service.clone(),
                FileTokenStore::in_dir(&self.state_dir),
            )
            .detect_source(),
            TokenBackend::File => FileTokenStore::in_dir(&self.state_dir)
                .get_token()
                .map(|_| "file"),
            TokenBackend::Memory => self.session.access_token().map(|_| "memory"),
        }
    }
}
