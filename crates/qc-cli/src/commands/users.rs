use qc_auth::gated;
use qc_core::{Action, Page};
use reqwest::Method;
use serde::Serialize;
use serde_json::{Value, json};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ListArgs;
use crate::cli::subcommands::users::{UserIdArgs, UserSetRoleArgs};
use crate::cli::subcommands::UserCommands;
use crate::commands::shared::gate;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::path::resource_path;
use crate::context::AppContext;
use crate::output::output;

const LOCATION: &str = "/users";
const COLLECTION: &str = "/core/users";

#[derive(Serialize)]
struct UserDeletedResponse<'a> {
    deleted: bool,
    id: &'a str,
}

/// Handle `qcon users`.
pub async fn handle(
    action: &UserCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        UserCommands::List(args) => list(args, ctx, flags).await,
        UserCommands::SetRole(args) => set_role(args, ctx, flags).await,
        UserCommands::Delete(args) => delete(args, ctx, flags).await,
    }
}

async fn list(args: &ListArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let user = gate::enter_console(ctx, LOCATION).await?;
    let limit = effective_limit(args.limit, ctx.config.general.default_limit);
    let query = [("limit", limit.to_string())];

    match gated(Some(&user), Page::Users, || {
        ctx.api.get_json::<Value>(COLLECTION, &query)
    })
    .await?
    {
        Ok(users) => output(&users, flags.format),
        Err(panel) => gate::deny(&panel, flags),
    }
}

async fn set_role(
    args: &UserSetRoleArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let user = gate::enter_console(ctx, LOCATION).await?;
    gate::authorize(&user, Action::ChangeUserRole, flags)?;

    let updated: Value = ctx
        .api
        .send_json(
            Method::PATCH,
            &resource_path(COLLECTION, &args.id),
            &json!({ "role": args.role }),
        )
        .await?;
    tracing::info!(target_user = %args.id, role = %args.role, "user role changed");
    output(&updated, flags.format)
}

async fn delete(args: &UserIdArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let user = gate::enter_console(ctx, LOCATION).await?;
    gate::authorize(&user, Action::DeleteUser, flags)?;

    ctx.api.delete(&resource_path(COLLECTION, &args.id)).await?;
    tracing::info!(target_user = %args.id, "user deleted");
    output(
        &UserDeletedResponse {
            deleted: true,
            id: &args.id,
        },
        flags.format,
    )
}
