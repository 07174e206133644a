use std::sync::Arc;

use qc_core::UserIdentity;
use tokio::sync::{Mutex, watch};

use super::SessionObserver;
use super::state::{AuthOutcome, Session};
use crate::claims;
use crate::credentials::CredentialPair;
use crate::error::AuthError;
use crate::identity::IdentityService;
use crate::projection::{ProjectionStore, ProjectionWriter};
use crate::token_store::TokenStorage;

/// Access tokens expiring within this window are refreshed before use.
pub const REFRESH_BUFFER_SECS: i64 = 60;

/// Owner of the console session.
///
/// Every mutation (`login`, `login_with_code`, `check_auth`, `logout`,
/// `invalidate`) runs under one operation lock, so a slower identity fetch can
/// never overwrite the result of a later one. Token refresh has its own lock.
pub struct SessionStore<I> {
    tokens: Arc<dyn TokenStorage>,
    identity: I,
    state: watch::Sender<Session>,
    observers: Vec<Box<dyn SessionObserver>>,
    op_lock: Mutex<()>,
    refresh_lock: Mutex<()>,
}

impl<I: IdentityService> SessionStore<I> {
    #[must_use]
    pub fn new(tokens: Arc<dyn TokenStorage>, identity: I) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            tokens,
            identity,
            state,
            observers: Vec::new(),
            op_lock: Mutex::new(()),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Seed the initial state from `store` and persist every later transition.
    #[must_use]
    pub fn with_projection(mut self, store: Arc<dyn ProjectionStore>) -> Self {
        match store.load() {
            Ok(Some(projection)) => {
                tracing::debug!(
                    is_authenticated = projection.is_authenticated,
                    "restored session projection"
                );
                self.state.send_replace(projection.into_session());
            }
            Ok(None) => {}
            Err(error) => tracing::warn!(%error, "ignoring unreadable session projection"),
        }
        self.observers.push(Box::new(ProjectionWriter::new(store)));
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Box<dyn SessionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    #[must_use]
    pub fn identity(&self) -> &I {
        &self.identity
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Current access token, if stored.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.tokens.get_token()
    }

    /// Store `credentials` and resolve the identity behind them.
    ///
    /// Resolves only once the session has settled.
    pub async fn login(&self, credentials: CredentialPair) -> AuthOutcome {
        let _op = self.op_lock.lock().await;
        self.login_locked(credentials).await
    }

    /// Exchange an OAuth authorization code, then behave as [`Self::login`].
    pub async fn login_with_code(&self, code: &str) -> AuthOutcome {
        let _op = self.op_lock.lock().await;
        self.publish(self.snapshot().loading());
        match self.identity.exchange_code(code).await {
            Ok(credentials) => self.login_locked(credentials).await,
            Err(error) => {
                tracing::warn!(%error, "authorization code exchange failed");
                self.publish(Session::unauthenticated(Some(error.to_string())));
                AuthOutcome::Unauthenticated
            }
        }
    }

    /// Revalidate stored credentials against the identity service.
    pub async fn check_auth(&self) -> AuthOutcome {
        let _op = self.op_lock.lock().await;
        self.check_auth_locked().await
    }

    /// Sign out. Never fails; local state is cleared whatever the network does.
    pub async fn logout(&self) {
        let _op = self.op_lock.lock().await;
        self.publish(self.snapshot().loading());

        if let Some(refresh_token) = self.tokens.get_refresh_token() {
            if let Err(error) = self.identity.logout(&refresh_token).await {
                tracing::warn!(%error, "logout notification failed; clearing local session anyway");
            }
        }
        self.clear_credentials();
        self.publish(Session::default());
        tracing::info!("signed out");
    }

    /// Trade the stored refresh token for a new pair and persist it.
    ///
    /// # Errors
    ///
    /// `AuthError::NoRefreshToken` when none is stored, otherwise whatever the
    /// identity service or the token store report.
    pub async fn refresh_token(&self) -> Result<CredentialPair, AuthError> {
        let _refresh = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Refresh after a `401` observed with `stale_access_token`.
    ///
    /// Concurrent callers holding the same stale token share one network
    /// refresh; later callers pick up the token the first one stored.
    ///
    /// # Errors
    ///
    /// See [`Self::refresh_token`].
    pub async fn refresh_after_unauthorized(
        &self,
        stale_access_token: &str,
    ) -> Result<String, AuthError> {
        let _refresh = self.refresh_lock.lock().await;
        if let Some(current) = self.tokens.get_token() {
            if current != stale_access_token {
                tracing::debug!("access token already refreshed by another caller");
                return Ok(current);
            }
        }
        self.refresh_locked().await.map(|pair| pair.access_token)
    }

    /// Tear the session down after the transport could not recover.
    pub async fn invalidate(&self, reason: &str) {
        let _op = self.op_lock.lock().await;
        tracing::warn!(reason, "session invalidated");
        self.clear_credentials();
        self.publish(Session::unauthenticated(Some(reason.to_string())));
    }

    async fn login_locked(&self, credentials: CredentialPair) -> AuthOutcome {
        if let Err(error) = self
            .tokens
            .set_tokens(&credentials.access_token, &credentials.refresh_token)
        {
            tracing::warn!(%error, "failed to store credentials");
            self.publish(Session::unauthenticated(Some(error.to_string())));
            return AuthOutcome::Unauthenticated;
        }
        self.publish(self.snapshot().token_acquired());

        let outcome = self.check_auth_locked().await;
        if let Some(user) = outcome.user() {
            tracing::info!(user_id = %user.id, role = %user.role, "signed in");
        }
        outcome
    }

    async fn check_auth_locked(&self) -> AuthOutcome {
        let Some(access_token) = self.tokens.get_token() else {
            self.publish(Session::unauthenticated(None));
            return AuthOutcome::Unauthenticated;
        };

        let current = self.snapshot();
        if !current.is_loading {
            self.publish(current.loading());
        }

        match self.resolve_identity(access_token).await {
            Ok(user) => {
                let session = Session::resolved(user);
                let outcome = session.outcome();
                self.publish(session);
                outcome
            }
            Err(error) => {
                tracing::warn!(%error, "identity check failed; clearing credentials");
                self.clear_credentials();
                self.publish(Session::unauthenticated(Some(error.to_string())));
                AuthOutcome::Unauthenticated
            }
        }
    }

    async fn resolve_identity(&self, access_token: String) -> Result<UserIdentity, AuthError> {
        let claims = claims::decode(&access_token)?;

        let access_token = if claims.is_near_expiry(REFRESH_BUFFER_SECS)
            && self.tokens.get_refresh_token().is_some()
        {
            tracing::debug!("access token near expiry; refreshing before identity fetch");
            self.refresh_token()
                .await
                .map_err(|e| AuthError::IdentityFetch(format!("token refresh failed: {e}")))?
                .access_token
        } else {
            access_token
        };
        let subject = claims::decode_subject(&access_token)?;

        self.identity
            .fetch_user(&subject, &access_token)
            .await
            .map_err(|e| AuthError::IdentityFetch(e.to_string()))
    }

    async fn refresh_locked(&self) -> Result<CredentialPair, AuthError> {
        let refresh_token = self
            .tokens
            .get_refresh_token()
            .ok_or(AuthError::NoRefreshToken)?;
        let pair = self.identity.refresh(&refresh_token).await?;
        self.tokens
            .set_tokens(&pair.access_token, &pair.refresh_token)?;
        tracing::debug!("access token refreshed");
        Ok(pair)
    }

    fn clear_credentials(&self) {
        if let Err(error) = self.tokens.clear_tokens() {
            tracing::warn!(%error, "failed to clear stored credentials");
        }
    }

    fn publish(&self, session: Session) {
        tracing::debug!(phase = ?session.phase(), loading = session.is_loading, "session transition");
        for observer in &self.observers {
            observer.on_transition(&session);
        }
        self.state.send_replace(session);
    }
}
