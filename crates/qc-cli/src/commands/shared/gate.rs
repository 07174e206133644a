use anyhow::{anyhow, bail};
use qc_auth::{AccessDeniedPanel, GuardDecision, PageAccess, RouteGuard, authorize_action, check_page};
use qc_core::{Action, UserIdentity};

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Revalidate the session, then pass the route guard for `location`.
///
/// Returns the signed-in user when the console shell may render.
pub async fn enter_console(ctx: &AppContext, location: &str) -> anyhow::Result<UserIdentity> {
    ctx.session.check_auth().await;
    let session = ctx.session.snapshot();

    match RouteGuard::evaluate(&session, location) {
        GuardDecision::Render => session
            .user
            .ok_or_else(|| anyhow!("session settled without a user")),
        GuardDecision::RedirectToLogin { from } => match session.error {
            Some(reason) => bail!("not signed in ({reason}); run `qcon auth login` to open {from}"),
            None => bail!("not signed in; run `qcon auth login` to open {from}"),
        },
        GuardDecision::AccessDenied => Err(anyhow!(
            session
                .error
                .unwrap_or_else(|| String::from("access denied"))
        )),
        GuardDecision::Loading => bail!("session is still loading"),
    }
}

/// Print the denial panel and fail the command.
pub fn deny(panel: &AccessDeniedPanel, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(panel, flags.format)?;
    Err(anyhow!("{panel}"))
}

/// Page check for the action's page, then the action's own allow-list.
pub fn authorize(user: &UserIdentity, action: Action, flags: &GlobalFlags) -> anyhow::Result<()> {
    if let PageAccess::Denied(panel) = check_page(Some(user), action.page()) {
        return deny(&panel, flags);
    }
    authorize_action(Some(user), action)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use qc_core::Role;

    use super::*;
    use crate::cli::OutputFormat;

    fn flags() -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Raw,
            quiet: true,
            verbose: false,
        }
    }

    #[test]
    fn moderator_may_change_quest_status_but_not_delete() {
        let moderator = UserIdentity::new("1", Role::Moderator);
        assert!(authorize(&moderator, Action::ChangeQuestStatus, &flags()).is_ok());
        let err = authorize(&moderator, Action::DeleteQuest, &flags()).unwrap_err();
        assert!(err.to_string().contains("delete_quest"));
    }

    #[test]
    fn page_denial_precedes_action_check() {
        let finance = UserIdentity::new("2", Role::Finance);
        let err = authorize(&finance, Action::DeleteUser, &flags()).unwrap_err();
        assert!(err.to_string().starts_with("Access denied (users)"));
    }
}
