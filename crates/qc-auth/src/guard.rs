//! Navigation guard and page-level role checks.
//!
//! [`RouteGuard`] decides whether the console shell may render at all;
//! [`check_page`], [`authorize_action`] and [`gated`] apply the narrower
//! per-surface allow-lists. Both layers consult the current session on every
//! call and cache nothing.

use std::fmt;
use std::future::Future;

use qc_core::{Action, MINIMUM_ALLOWLIST, Page, Role, UserIdentity};
use serde::Serialize;

use crate::error::AuthError;
use crate::session::Session;

/// Location the login screen returns to after a successful sign-in.
pub const DEFAULT_LOCATION: &str = "/";

/// What to show for a requested location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// A session operation is in flight.
    Loading,
    /// Not signed in; `from` is the location to return to.
    RedirectToLogin { from: String },
    /// Signed in with a role outside the minimum allow-list.
    AccessDenied,
    Render,
}

/// Top-level guard around every protected location.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteGuard;

impl RouteGuard {
    #[must_use]
    pub fn evaluate(session: &Session, requested_location: &str) -> GuardDecision {
        if session.is_loading {
            return GuardDecision::Loading;
        }
        if !session.is_authenticated {
            let from = if requested_location.trim().is_empty() {
                DEFAULT_LOCATION.to_string()
            } else {
                requested_location.to_string()
            };
            return GuardDecision::RedirectToLogin { from };
        }
        match &session.user {
            Some(user) if user.role.is_in(MINIMUM_ALLOWLIST) => GuardDecision::Render,
            _ => GuardDecision::AccessDenied,
        }
    }
}

/// Denial panel rendered in place of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessDeniedPanel {
    pub page: Page,
    pub message: String,
    pub role: Option<Role>,
    pub allowed_roles: Vec<Role>,
}

impl fmt::Display for AccessDeniedPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Access denied ({}): {}", self.page, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAccess {
    Granted,
    Denied(AccessDeniedPanel),
}

impl PageAccess {
    #[must_use]
    pub const fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Check whether `user` may view `page`.
#[must_use]
pub fn check_page(user: Option<&UserIdentity>, page: Page) -> PageAccess {
    let role = user.map(|u| u.role);
    if role.is_some_and(|r| r.is_in(page.view_roles())) {
        return PageAccess::Granted;
    }
    tracing::debug!(%page, ?role, "page access denied");
    PageAccess::Denied(AccessDeniedPanel {
        page,
        message: page.denied_message().to_string(),
        role,
        allowed_roles: page.view_roles().to_vec(),
    })
}

/// A mutation refused at invocation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDenied {
    pub action: Action,
    pub role: Option<Role>,
}

impl fmt::Display for AccessDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.role {
            Some(role) => write!(f, "role '{role}' may not {}", self.action),
            None => write!(f, "sign in to {}", self.action),
        }
    }
}

impl std::error::Error for AccessDenied {}

impl From<AccessDenied> for AuthError {
    fn from(denied: AccessDenied) -> Self {
        match denied.role {
            Some(role) => Self::InsufficientRole { role },
            None => Self::NoCredential,
        }
    }
}

/// Check whether `user` may perform `action` right now.
///
/// # Errors
///
/// Returns [`AccessDenied`] when the role is missing or outside the action's
/// allow-list.
pub fn authorize_action(user: Option<&UserIdentity>, action: Action) -> Result<(), AccessDenied> {
    let role = user.map(|u| u.role);
    if role.is_some_and(|r| r.is_in(action.allowed_roles())) {
        Ok(())
    } else {
        tracing::debug!(%action, ?role, "action refused");
        Err(AccessDenied { action, role })
    }
}

/// Run `load` only when the page check grants access.
///
/// # Errors
///
/// Propagates the error of `load`.
pub async fn gated<T, E, F, Fut>(
    user: Option<&UserIdentity>,
    page: Page,
    load: F,
) -> Result<Result<T, AccessDeniedPanel>, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    match check_page(user, page) {
        PageAccess::Granted => load().await.map(Ok),
        PageAccess::Denied(panel) => Ok(Err(panel)),
    }
}
