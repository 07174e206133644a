mod login;
mod logout;
mod status;
mod url;

use qc_auth::Session;
use qc_core::{Role, UserStatus};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AuthCommands;
use crate::context::AppContext;

/// Handle `qcon auth <subcommand>`.
pub async fn handle(
    action: &AuthCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        AuthCommands::Login(args) => login::handle(args, ctx, flags).await,
        AuthCommands::Logout => logout::handle(ctx, flags).await,
        AuthCommands::Status => status::handle(ctx, flags).await,
        AuthCommands::Url => url::handle(ctx, flags),
    }
}

/// Public view of a session. Never carries credentials.
#[derive(Debug, Serialize)]
struct SessionSummary {
    authenticated: bool,
    phase: &'static str,
    user_id: Option<String>,
    name: Option<String>,
    email: Option<String>,
    role: Option<Role>,
    status: Option<UserStatus>,
    error: Option<String>,
}

impl From<&Session> for SessionSummary {
    fn from(session: &Session) -> Self {
        let user = session.user.as_ref();
        Self {
            authenticated: session.is_authenticated,
            phase: session.phase().as_str(),
            user_id: user.map(|u| u.id.clone()),
            name: user.map(qc_core::UserIdentity::display_name),
            email: user.and_then(|u| u.email.clone()),
            role: user.map(|u| u.role),
            status: user.map(|u| u.status),
            error: session.error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use qc_core::UserIdentity;

    use super::*;

    #[test]
    fn summary_of_forbidden_session_keeps_name_and_error() {
        let user = UserIdentity::new("4", Role::Creator).with_name("Maya", "Lind");
        let summary = SessionSummary::from(&Session::resolved(user));
        assert!(summary.authenticated);
        assert_eq!(summary.phase, "authenticated_forbidden");
        assert_eq!(summary.name.as_deref(), Some("Maya Lind"));
        assert!(summary.error.is_some());
    }

    #[test]
    fn summary_of_signed_out_session_is_empty() {
        let summary = SessionSummary::from(&Session::default());
        assert!(!summary.authenticated);
        assert_eq!(summary.phase, "unauthenticated");
        assert_eq!(summary.user_id, None);
        assert_eq!(summary.role, None);
    }
}
