use qc_auth::gated;
use qc_core::{Action, Page};
use serde::Serialize;
use serde_json::Value;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::QuestCommands;
use crate::cli::subcommands::quests::QuestIdArgs;
use crate::commands::shared::gate;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::path::resource_path;
use crate::context::AppContext;
use crate::output::output;

const LOCATION: &str = "/quests";
const COLLECTION: &str = "/core/quests";

#[derive(Serialize)]
struct QuestDeletedResponse<'a> {
    deleted: bool,
    id: &'a str,
}

/// Handle `qcon quests`.
pub async fn handle(
    action: &QuestCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        QuestCommands::List(args) => {
            let user = gate::enter_console(ctx, LOCATION).await?;
            let limit = effective_limit(args.limit, ctx.config.general.default_limit);
            let query = [("limit", limit.to_string())];

            match gated(Some(&user), Page::Quests, || {
                ctx.api.get_json::<Value>(COLLECTION, &query)
            })
            .await?
            {
                Ok(quests) => output(&quests, flags.format),
                Err(panel) => gate::deny(&panel, flags),
            }
        }
        QuestCommands::Delete(args) => delete(args, ctx, flags).await,
    }
}

async fn delete(args: &QuestIdArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let user = gate::enter_console(ctx, LOCATION).await?;
    gate::authorize(&user, Action::DeleteQuest, flags)?;

    ctx.api.delete(&resource_path(COLLECTION, &args.id)).await?;
    tracing::info!(quest = %args.id, "quest deleted");
    output(
        &QuestDeletedResponse {
            deleted: true,
            id: &args.id,
        },
        flags.format,
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use qc_auth::MemoryTokenStore;
    use qc_core::Role;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::cli::OutputFormat;
    use crate::context::tests_support::memory_context;

    // {"sub":"3"}, unsigned
    const TOKEN_USER_3: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiIzIn0.sig";

    fn flags() -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Raw,
            quiet: true,
            verbose: false,
        }
    }

    async fn setup(role: Role) -> (MockServer, AppContext) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/core/users/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 3, "role": role })))
            .mount(&server)
            .await;
        let tokens = Arc::new(MemoryTokenStore::with_tokens(Some(TOKEN_USER_3), Some("r1")));
        let ctx = memory_context(&server.uri(), tokens);
        (server, ctx)
    }

    #[tokio::test]
    async fn moderator_cannot_delete_quests() {
        let (server, ctx) = setup(Role::Moderator).await;
        Mock::given(method("DELETE"))
            .and(path("/core/quests/11"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let err = delete(&QuestIdArgs { id: "11".into() }, &ctx, &flags())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("delete_quest"));
    }

    #[tokio::test]
    async fn admin_deletes_quest() {
        let (server, ctx) = setup(Role::Admin).await;
        Mock::given(method("DELETE"))
            .and(path("/core/quests/11"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        delete(&QuestIdArgs { id: "11".into() }, &ctx, &flags())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn finance_sees_quest_denial_panel() {
        let (server, ctx) = setup(Role::Finance).await;
        Mock::given(method("GET"))
            .and(path("/core/quests"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let action = QuestCommands::List(crate::cli::subcommands::ListArgs { limit: None });
        let err = handle(&action, &ctx, &flags()).await.unwrap_err();
        assert!(err.to_string().contains("Access denied (quests)"));
    }
}
