//! Credential pair storage.
//!
//! The session core only needs four operations from its storage
//! collaborator; durability is the implementation's concern:
//!
//! - [`MemoryTokenStore`]: volatile, used by tests and `storage.backend = "memory"`
//! - [`FileTokenStore`]: `<state_dir>/credentials.json`, 0600 on Unix
//! - [`KeyringTokenStore`]: OS keychain, falls back to the file store

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

const KEYRING_ACCESS_USER: &str = "access-token";
const KEYRING_REFRESH_USER: &str = "refresh-token";
const CREDENTIALS_FILE_NAME: &str = "credentials.json";

/// Storage collaborator for the credential pair.
///
/// `clear_tokens` must be idempotent and `set_tokens` last-write-wins.
pub trait TokenStorage: Send + Sync + 'static {
    fn get_token(&self) -> Option<String>;

    fn get_refresh_token(&self) -> Option<String>;

    /// # Errors
    ///
    /// Returns `AuthError::TokenStore` if the pair cannot be persisted.
    fn set_tokens(&self, access_token: &str, refresh_token: &str) -> Result<(), AuthError>;

    /// # Errors
    ///
    /// Returns `AuthError::TokenStore` if stored credentials cannot be removed.
    fn clear_tokens(&self) -> Result<(), AuthError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct StoredTokens {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl StoredTokens {
    fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// --- Memory ---

/// Volatile token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    inner: Mutex<StoredTokens>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an arbitrary (possibly partial) pair.
    #[must_use]
    pub fn with_tokens(access_token: Option<&str>, refresh_token: Option<&str>) -> Self {
        Self {
            inner: Mutex::new(StoredTokens {
                access_token: access_token.map(str::to_string),
                refresh_token: refresh_token.map(str::to_string),
            }),
        }
    }
}

impl TokenStorage for MemoryTokenStore {
    fn get_token(&self) -> Option<String> {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        non_empty(guard.access_token.clone())
    }

    fn get_refresh_token(&self) -> Option<String> {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        non_empty(guard.refresh_token.clone())
    }

    fn set_tokens(&self, access_token: &str, refresh_token: &str) -> Result<(), AuthError> {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = StoredTokens {
            access_token: Some(access_token.to_string()),
            refresh_token: Some(refresh_token.to_string()),
        };
        Ok(())
    }

    fn clear_tokens(&self) -> Result<(), AuthError> {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = StoredTokens::default();
        Ok(())
    }
}

// --- File ---

/// Credentials file under the console state directory.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store credentials in `<state_dir>/credentials.json`.
    #[must_use]
    pub fn in_dir(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(CREDENTIALS_FILE_NAME),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> StoredTokens {
        fs::read_to_string(&self.path)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .and_then(|s| match serde_json::from_str(&s) {
                Ok(tokens) => Some(tokens),
                Err(error) => {
                    tracing::warn!(%error, path = %self.path.display(), "ignoring unreadable credentials file");
                    None
                }
            })
            .unwrap_or_default()
    }

    fn write(&self, tokens: &StoredTokens) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AuthError::TokenStore(format!("mkdir {}: {e}", parent.display()))
            })?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Err(e) = fs::set_permissions(parent, fs::Permissions::from_mode(0o700)) {
                    tracing::warn!("failed to chmod 0700 {}: {e}", parent.display());
                }
            }
        }

        let body = serde_json::to_string(tokens)
            .map_err(|e| AuthError::TokenStore(format!("encode credentials: {e}")))?;
        fs::write(&self.path, body)
            .map_err(|e| AuthError::TokenStore(format!("write {}: {e}", self.path.display())))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600)).map_err(|e| {
                AuthError::TokenStore(format!("chmod {}: {e}", self.path.display()))
            })?;
        }

        Ok(())
    }
}

impl TokenStorage for FileTokenStore {
    fn get_token(&self) -> Option<String> {
        non_empty(self.read().access_token)
    }

    fn get_refresh_token(&self) -> Option<String> {
        non_empty(self.read().refresh_token)
    }

    fn set_tokens(&self, access_token: &str, refresh_token: &str) -> Result<(), AuthError> {
        self.write(&StoredTokens {
            access_token: Some(access_token.to_string()),
            refresh_token: Some(refresh_token.to_string()),
        })
    }

    fn clear_tokens(&self) -> Result<(), AuthError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                AuthError::TokenStore(format!("failed to delete {}: {e}", self.path.display()))
            })?;
        }
        Ok(())
    }
}

// --- Keyring ---

/// One secret per account name under a fixed service.
trait SecretBackend: Send + Sync + std::fmt::Debug {
    fn get(&self, user: &str) -> Option<String>;

    fn set(&self, user: &str, secret: &str) -> Result<(), String>;

    fn delete(&self, user: &str);
}

/// The OS keychain through `keyring`.
#[derive(Debug)]
struct OsKeyring {
    service: String,
}

impl OsKeyring {
    fn entry(&self, user: &str) -> Result<keyring::Entry, String> {
        keyring::Entry::new(&self.service, user).map_err(|error| {
            tracing::debug!(%error, "keyring unavailable");
            error.to_string()
        })
    }
}

impl SecretBackend for OsKeyring {
    fn get(&self, user: &str) -> Option<String> {
        self.entry(user).ok()?.get_password().ok()
    }

    fn set(&self, user: &str, secret: &str) -> Result<(), String> {
        self.entry(user)?
            .set_password(secret)
            .map_err(|e| e.to_string())
    }

    fn delete(&self, user: &str) {
        if let Ok(entry) = self.entry(user) {
            let _ = entry.delete_credential();
        }
    }
}

/// OS keychain store. Falls back to the credentials file if the keyring is
/// unavailable or rejects the write.
#[derive(Debug, Clone)]
pub struct KeyringTokenStore {
    backend: Arc<dyn SecretBackend>,
    fallback: FileTokenStore,
}

impl KeyringTokenStore {
    #[must_use]
    pub fn new(service: impl Into<String>, fallback: FileTokenStore) -> Self {
        Self {
            backend: Arc::new(OsKeyring {
                service: service.into(),
            }),
            fallback,
        }
    }

    fn load(&self, user: &str) -> Option<String> {
        self.backend.get(user).filter(|token| !token.trim().is_empty())
    }

    /// Write both entries or neither; reads prefer the keyring over the file.
    fn store_keyring(&self, access_token: &str, refresh_token: &str) -> Result<(), String> {
        let written = self
            .backend
            .set(KEYRING_ACCESS_USER, access_token)
            .and_then(|()| self.backend.set(KEYRING_REFRESH_USER, refresh_token));
        if written.is_err() {
            self.backend.delete(KEYRING_ACCESS_USER);
            self.backend.delete(KEYRING_REFRESH_USER);
        }
        written
    }

    /// Which tier currently holds an access token (for status display).
    #[must_use]
    pub fn detect_source(&self) -> Option<&'static str> {
        if self.load(KEYRING_ACCESS_USER).is_some() {
            return Some("keyring");
        }
        if self.fallback.get_token().is_some() {
            return Some("file");
        }
        None
    }
}

impl TokenStorage for KeyringTokenStore {
    fn get_token(&self) -> Option<String> {
        self.load(KEYRING_ACCESS_USER)
            .or_else(|| self.fallback.get_token())
    }

    fn get_refresh_token(&self) -> Option<String> {
        self.load(KEYRING_REFRESH_USER)
            .or_else(|| self.fallback.get_refresh_token())
    }

    fn set_tokens(&self, access_token: &str, refresh_token: &str) -> Result<(), AuthError> {
        match self.store_keyring(access_token, refresh_token) {
            Ok(()) => {
                // A stale file pair would shadow nothing but could leak later.
                self.fallback.clear_tokens()
            }
            Err(error) => {
                tracing::warn!(%error, "keyring store failed; falling back to file");
                self.fallback.set_tokens(access_token, refresh_token)
            }
        }
    }

    fn clear_tokens(&self) -> Result<(), AuthError> {
        for user in [KEYRING_ACCESS_USER, KEYRING_REFRESH_USER] {
            self.backend.delete(user);
        }
        self.fallback.clear_tokens()
    }
}

impl<T: TokenStorage + ?Sized> TokenStorage for Box<T> {
    fn get_token(&self) -> Option<String> {
        (**self).get_token()
    }

    fn get_refresh_token(&self) -> Option<String> {
        (**self).get_refresh_token()
    }

    fn set_tokens(&self, access_token: &str, refresh_token: &str) -> Result<(), AuthError> {
        (**self).set_tokens(access_token, refresh_token)
    }

    fn clear_tokens(&self) -> Result<(), AuthError> {
        (**self).clear_tokens()
    }
}
