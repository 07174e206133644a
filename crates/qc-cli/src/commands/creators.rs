use qc_auth::gated;
use qc_core::Page;
use serde_json::Value;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::CreatorCommands;
use crate::commands::shared::gate;
use crate::commands::shared::limit::effective_limit;
use crate::context::AppContext;
use crate::output::output;

/// Handle `qcon creators`.
pub async fn handle(
    action: &CreatorCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        CreatorCommands::List(args) => {
            let user = gate::enter_console(ctx, "/creators").await?;
            let limit = effective_limit(args.limit, ctx.config.general.default_limit);
            let query = [("limit", limit.to_string())];

            match gated(Some(&user), Page::Creators, || {
                ctx.api.get_json::<Value>("/core/creators", &query)
            })
            .await?
            {
                Ok(creators) => output(&creators, flags.format),
                Err(panel) => gate::deny(&panel, flags),
            }
        }
    }
}
