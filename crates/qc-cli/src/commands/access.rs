use qc_auth::{GuardDecision, PageAccess, RouteGuard, Session, authorize_action, check_page};
use qc_core::{Action, Page, Role};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AccessCommands;
use crate::cli::subcommands::access::AccessCheckArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct AccessCheckResponse {
    page: Page,
    location: String,
    phase: &'static str,
    role: Option<Role>,
    guard: &'static str,
    page_access: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<Action>,
    #[serde(skip_serializing_if = "Option::is_none")]
    action_allowed: Option<bool>,
    message: Option<String>,
}

/// Handle `qcon access`.
pub async fn handle(
    action: &AccessCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        AccessCommands::Check(args) => {
            ctx.session.check_auth().await;
            let response = evaluate(&ctx.session.snapshot(), args);
            output(&response, flags.format)
        }
    }
}

fn location_for(page: Page) -> String {
    match page {
        Page::Dashboard => String::from("/"),
        other => format!("/{other}"),
    }
}

fn evaluate(session: &Session, args: &AccessCheckArgs) -> AccessCheckResponse {
    let location = location_for(args.page);
    let decision = RouteGuard::evaluate(session, &location);
    let user = session.user.as_ref();

    let (page_access, page_message) = match check_page(user, args.page) {
        PageAccess::Granted => ("granted", None),
        PageAccess::Denied(panel) => ("denied", Some(panel.message)),
    };
    let action_result = args.action.map(|action| authorize_action(user, action));

    let message = match &decision {
        GuardDecision::Render => action_result
            .as_ref()
            .and_then(|result| result.as_ref().err().map(ToString::to_string))
            .or(page_message),
        _ => session.error.clone(),
    };

    AccessCheckResponse {
        page: args.page,
        location,
        phase: session.phase().as_str(),
        role: user.map(|u| u.role),
        guard: guard_label(&decision),
        page_access,
        action: args.action,
        action_allowed: action_result.map(|result| result.is_ok()),
        message,
    }
}

const fn guard_label(decision: &GuardDecision) -> &'static str {
    match decision {
        GuardDecision::Loading => "loading",
        GuardDecision::RedirectToLogin { .. } => "redirect_to_login",
        GuardDecision::AccessDenied => "access_denied",
        GuardDecision::Render => "render",
    }
}
