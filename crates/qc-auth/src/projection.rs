//! Persisted session projection.
//!
//! Only `{user, is_authenticated}` survives a restart. It seeds the optimistic
//! initial state and is superseded by the first `check_auth`; it never
//! carries tokens, loading or error flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use qc_core::UserIdentity;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::session::{Session, SessionObserver};

/// Namespace key of the persisted projection.
pub const PROJECTION_KEY: &str = "admin-auth-storage";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProjection {
    #[serde(default)]
    pub user: Option<UserIdentity>,
    #[serde(default)]
    pub is_authenticated: bool,
}

impl From<&Session> for SessionProjection {
    fn from(session: &Session) -> Self {
        Self {
            user: session.user.clone(),
            // Mid-login there is no user yet; that state must not outlive the process.
            is_authenticated: session.is_authenticated && session.user.is_some(),
        }
    }
}

impl SessionProjection {
    /// Optimistic session seeded from the projection.
    ///
    /// A record claiming authentication without a user restores as signed out.
    #[must_use]
    pub fn into_session(self) -> Session {
        let is_authenticated = self.is_authenticated && self.user.is_some();
        Session {
            user: self.user,
            is_authenticated,
            is_loading: false,
            error: None,
        }
    }
}

/// Persistence for the projection.
pub trait ProjectionStore: Send + Sync + 'static {
    /// # Errors
    ///
    /// Returns `AuthError::Projection` if a stored projection cannot be read.
    fn load(&self) -> Result<Option<SessionProjection>, AuthError>;

    /// # Errors
    ///
    /// Returns `AuthError::Projection` if the projection cannot be written.
    fn save(&self, projection: &SessionProjection) -> Result<(), AuthError>;
}

fn encode(projection: &SessionProjection) -> Result<String, AuthError> {
    serde_json::to_string(projection).map_err(|e| AuthError::Projection(e.to_string()))
}

fn decode(raw: &str) -> Result<Option<SessionProjection>, AuthError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(raw)
        .map(Some)
        .map_err(|e| AuthError::Projection(format!("invalid {PROJECTION_KEY}: {e}")))
}

/// `<state_dir>/admin-auth-storage.json`.
#[derive(Debug, Clone)]
pub struct FileProjectionStore {
    path: PathBuf,
}

impl FileProjectionStore {
    #[must_use]
    pub fn in_dir(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(format!("{PROJECTION_KEY}.json")),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProjectionStore for FileProjectionStore {
    fn load(&self) -> Result<Option<SessionProjection>, AuthError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => decode(&raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AuthError::Projection(format!(
                "read {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn save(&self, projection: &SessionProjection) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AuthError::Projection(format!("mkdir {}: {e}", parent.display())))?;
        }
        fs::write(&self.path, encode(projection)?)
            .map_err(|e| AuthError::Projection(format!("write {}: {e}", self.path.display())))
    }
}

/// In-memory projection that keeps the exact serialized text.
#[derive(Debug, Default)]
pub struct MemoryProjectionStore {
    raw: Mutex<Option<String>>,
}

impl MemoryProjectionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with serialized text, as if written by an earlier run.
    #[must_use]
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
        }
    }

    /// The last serialized projection.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.raw
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ProjectionStore for MemoryProjectionStore {
    fn load(&self) -> Result<Option<SessionProjection>, AuthError> {
        self.raw().as_deref().map_or(Ok(None), decode)
    }

    fn save(&self, projection: &SessionProjection) -> Result<(), AuthError> {
        let encoded = encode(projection)?;
        *self.raw.lock().unwrap_or_else(PoisonError::into_inner) = Some(encoded);
        Ok(())
    }
}

/// Observer that writes the projection after every transition.
pub struct ProjectionWriter {
    store: Arc<dyn ProjectionStore>,
}

impl ProjectionWriter {
    #[must_use]
    pub fn new(store: Arc<dyn ProjectionStore>) -> Self {
        Self { store }
    }
}

impl SessionObserver for ProjectionWriter {
    fn on_transition(&self, session: &Session) {
        if let Err(error) = self.store.save(&SessionProjection::from(session)) {
            tracing::warn!(%error, "failed to persist session projection");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use qc_core::Role;

    #[test]
    fn projection_drops_loading_and_error() {
        let session = Session {
            user: Some(UserIdentity::new("7", Role::Moderator)),
            is_authenticated: true,
            is_loading: true,
            error: Some("boom".into()),
        };
        let projection = SessionProjection::from(&session);
        let raw = encode(&projection).unwrap();
        assert!(!raw.contains("is_loading"));
        assert!(!raw.contains("boom"));

        let restored = projection.into_session();
        assert_eq!(restored.user, session.user);
        assert!(restored.is_authenticated);
        assert!(!restored.is_loading);
        assert_eq!(restored.error, None);
    }

    #[test]
    fn authenticated_record_without_user_restores_signed_out() {
        let store = MemoryProjectionStore::with_raw(r#"{"user":null,"is_authenticated":true}"#);
        let restored = store.load().unwrap().unwrap().into_session();
        assert_eq!(restored, Session::default());
        assert_eq!(
            crate::RouteGuard::evaluate(&restored, "/users"),
            crate::GuardDecision::RedirectToLogin {
                from: "/users".into()
            }
        );
    }

    #[test]
    fn token_acquired_state_is_not_persisted_as_authenticated() {
        let store = Arc::new(MemoryProjectionStore::new());
        let writer = ProjectionWriter::new(store.clone());
        writer.on_transition(&Session::default().token_acquired());
        let saved = store.load().unwrap().unwrap();
        assert!(!saved.is_authenticated);
        assert_eq!(saved.user, None);
    }

    #[test]
    fn memory_store_roundtrip_keeps_raw_text() {
        let store = MemoryProjectionStore::new();
        assert_eq!(store.load().unwrap(), None);

        let projection = SessionProjection {
            user: Some(UserIdentity::new("1", Role::Admin)),
            is_authenticated: true,
        };
        store.save(&projection).unwrap();
        assert!(store.raw().unwrap().contains("\"is_authenticated\":true"));
        assert_eq!(store.load().unwrap(), Some(projection));
    }

    #[test]
    fn memory_store_rejects_garbage() {
        let store = MemoryProjectionStore::with_raw("{oops");
        assert!(matches!(store.load(), Err(AuthError::Projection(_))));
    }

    #[test]
    fn file_store_missing_file_is_none() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = FileProjectionStore::in_dir(tmp.path());
        assert_eq!(store.load().unwrap(), None);
        assert!(store.path().ends_with("admin-auth-storage.json"));
    }

    #[test]
    fn file_store_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = FileProjectionStore::in_dir(&tmp.path().join("nested"));
        let projection = SessionProjection {
            user: Some(UserIdentity::new("3", Role::Finance)),
            is_authenticated: true,
        };
        store.save(&projection).unwrap();
        assert_eq!(store.load().unwrap(), Some(projection));
    }

    #[test]
    fn writer_saves_on_transition() {
        let store = Arc::new(MemoryProjectionStore::new());
        let writer = ProjectionWriter::new(store.clone());
        writer.on_transition(&Session::authenticated(UserIdentity::new("9", Role::Admin)));
        let saved = store.load().unwrap().unwrap();
        assert_eq!(saved.user.map(|u| u.id), Some("9".to_string()));
    }
}
