//! # qc-auth
//!
//! Authentication and authorization core for the quest admin console.
//!
//! Provides the [`SessionStore`] (login, `check_auth`, logout, refresh),
//! pluggable credential storage (memory, file, OS keychain), the REST
//! identity client, the [`RouteGuard`] with per-page and per-action role
//! checks, and an authorized transport that refreshes on `401`.

pub mod browser_flow;
pub mod claims;
pub mod credentials;
pub mod error;
pub mod guard;
pub mod identity;
pub mod projection;
pub mod session;
pub mod token_store;
pub mod transport;

pub use credentials::CredentialPair;
pub use error::AuthError;
pub use guard::{
    AccessDenied, AccessDeniedPanel, GuardDecision, PageAccess, RouteGuard, authorize_action,
    check_page, gated,
};
pub use identity::{HttpIdentityClient, IdentityService};
pub use projection::{
    FileProjectionStore, MemoryProjectionStore, PROJECTION_KEY, ProjectionStore, ProjectionWriter,
    SessionProjection,
};
pub use session::{AuthOutcome, Session, SessionObserver, SessionPhase, SessionStore};
pub use token_store::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStorage};
pub use transport::ApiClient;
