use qc_core::{MINIMUM_ALLOWLIST, UserIdentity};

use crate::error::AuthError;

/// Authentication/authorization state of the console.
///
/// Transitions are plain functions on values; the store publishes the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<UserIdentity>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Node of the session state machine, derived from the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    Unauthenticated,
    /// Credentials stored, identity not yet resolved.
    TokenAcquired,
    Authenticated,
    /// Signed in, but the role may not use the console.
    AuthenticatedForbidden,
}

impl SessionPhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::TokenAcquired => "token_acquired",
            Self::Authenticated => "authenticated",
            Self::AuthenticatedForbidden => "authenticated_forbidden",
        }
    }
}

/// Result of `login` / `check_auth`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated(UserIdentity),
    Forbidden(UserIdentity),
    Unauthenticated,
}

impl AuthOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    #[must_use]
    pub const fn user(&self) -> Option<&UserIdentity> {
        match self {
            Self::Authenticated(user) | Self::Forbidden(user) => Some(user),
            Self::Unauthenticated => None,
        }
    }
}

impl Session {
    /// Settled, signed-in session for a console role.
    #[must_use]
    pub const fn authenticated(user: UserIdentity) -> Self {
        Self {
            user: Some(user),
            is_authenticated: true,
            is_loading: false,
            error: None,
        }
    }

    /// Settled session for a role outside the minimum allow-list.
    #[must_use]
    pub fn forbidden(user: UserIdentity) -> Self {
        let error = AuthError::InsufficientRole { role: user.role }.to_string();
        Self {
            user: Some(user),
            is_authenticated: true,
            is_loading: false,
            error: Some(error),
        }
    }

    /// Settled, signed-out session.
    #[must_use]
    pub const fn unauthenticated(error: Option<String>) -> Self {
        Self {
            user: None,
            is_authenticated: false,
            is_loading: false,
            error,
        }
    }

    /// Credentials stored; identity resolution pending. `user` is untouched.
    #[must_use]
    pub fn token_acquired(self) -> Self {
        Self {
            is_authenticated: true,
            is_loading: true,
            error: None,
            ..self
        }
    }

    #[must_use]
    pub fn loading(self) -> Self {
        Self {
            is_loading: true,
            ..self
        }
    }

    /// Settle from a resolved identity, applying the minimum allow-list.
    #[must_use]
    pub fn resolved(user: UserIdentity) -> Self {
        if user.role.is_in(MINIMUM_ALLOWLIST) {
            Self::authenticated(user)
        } else {
            Self::forbidden(user)
        }
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match (self.is_authenticated, self.is_loading, &self.user) {
            (false, _, _) => SessionPhase::Unauthenticated,
            (true, true, _) | (true, false, None) => SessionPhase::TokenAcquired,
            (true, false, Some(user)) => {
                if user.role.is_in(MINIMUM_ALLOWLIST) {
                    SessionPhase::Authenticated
                } else {
                    SessionPhase::AuthenticatedForbidden
                }
            }
        }
    }

    /// Outcome view of a settled session.
    #[must_use]
    pub fn outcome(&self) -> AuthOutcome {
        match (self.phase(), &self.user) {
            (SessionPhase::Authenticated, Some(user)) => AuthOutcome::Authenticated(user.clone()),
            (SessionPhase::AuthenticatedForbidden, Some(user)) => {
                AuthOutcome::Forbidden(user.clone())
            }
            _ => AuthOutcome::Unauthenticated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use qc_core::Role;

    #[test]
    fn default_is_unauthenticated() {
        let session = Session::default();
        assert_eq!(session.phase(), SessionPhase::Unauthenticated);
        assert_eq!(session.outcome(), AuthOutcome::Unauthenticated);
    }

    #[test]
    fn token_acquired_keeps_user_and_clears_error() {
        let prior = Session {
            user: Some(UserIdentity::new("1", Role::Admin)),
            is_authenticated: false,
            is_loading: false,
            error: Some("old".into()),
        };
        let next = prior.clone().token_acquired();
        assert_eq!(next.user, prior.user);
        assert!(next.is_authenticated);
        assert!(next.is_loading);
        assert_eq!(next.error, None);
        assert_eq!(next.phase(), SessionPhase::TokenAcquired);
    }

    #[test]
    fn resolved_applies_minimum_allowlist() {
        for role in [Role::Admin, Role::SuperAdmin, Role::Moderator, Role::Finance] {
            let session = Session::resolved(UserIdentity::new("1", role));
            assert_eq!(session.phase(), SessionPhase::Authenticated, "{role}");
            assert_eq!(session.error, None);
        }
        for role in [Role::User, Role::Creator] {
            let session = Session::resolved(UserIdentity::new("1", role));
            assert_eq!(session.phase(), SessionPhase::AuthenticatedForbidden, "{role}");
            assert!(session.is_authenticated);
            assert!(session.error.as_deref().is_some_and(|e| e.contains(role.as_str())));
            assert!(matches!(session.outcome(), AuthOutcome::Forbidden(_)));
        }
    }

    #[test]
    fn unauthenticated_drops_user() {
        let session = Session::unauthenticated(Some("boom".into()));
        assert_eq!(session.user, None);
        assert!(!session.is_authenticated);
        assert!(!session.is_loading);
        assert_eq!(session.error.as_deref(), Some("boom"));
    }

    #[test]
    fn outcome_success_only_when_authenticated() {
        let user = UserIdentity::new("1", Role::Finance);
        assert!(AuthOutcome::Authenticated(user.clone()).is_success());
        assert!(!AuthOutcome::Forbidden(user).is_success());
        assert!(!AuthOutcome::Unauthenticated.is_success());
    }
}
