//! Cross-cutting error types.
//!
//! Domain-specific errors (`AuthError`, `ConfigError`) live in their own
//! crates. Everything converges into `anyhow::Error` in `qc-cli`.

use thiserror::Error;

/// Errors that can be raised while parsing or validating core types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A role string outside the closed enumeration.
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// A page name that does not map to a console surface.
    #[error("Unknown page: {0}")]
    UnknownPage(String),

    /// An action name that does not map to a console mutation.
    #[error("Unknown action: {0}")]
    UnknownAction(String),
}
