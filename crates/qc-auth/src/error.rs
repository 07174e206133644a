use qc_core::Role;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not authenticated — run `qcon auth login`")]
    NoCredential,

    #[error("no refresh token stored — run `qcon auth login`")]
    NoRefreshToken,

    #[error("malformed access token: {0}")]
    MalformedToken(String),

    #[error("could not resolve the signed-in user: {0}")]
    IdentityFetch(String),

    #[error("access denied: role '{role}' may not use the admin console")]
    InsufficientRole { role: Role },

    #[error("session expired — run `qcon auth login`")]
    SessionExpired,

    #[error("{operation}: HTTP {status}: {detail}")]
    Http {
        operation: &'static str,
        status: u16,
        detail: String,
    },

    #[error("{operation}: {source}")]
    Request {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("token store error: {0}")]
    TokenStore(String),

    #[error("session projection error: {0}")]
    Projection(String),

    #[error("browser login failed: {0}")]
    BrowserFlow(String),
}

impl AuthError {
    /// HTTP status carried by the error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
