use std::time::Duration;

use anyhow::bail;
use qc_auth::AuthOutcome;

use super::SessionSummary;
use crate::cli::GlobalFlags;
use crate::cli::subcommands::auth::AuthLoginArgs;
use crate::context::AppContext;
use crate::output::output;

pub async fn handle(
    args: &AuthLoginArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let code = match args.code.as_deref() {
        Some(code) => code.trim().to_string(),
        None => obtain_code(ctx).await?,
    };
    if code.is_empty() {
        bail!("auth login: authorization code is empty");
    }

    let outcome = ctx.session.login_with_code(&code).await;
    let session = ctx.session.snapshot();
    output(&SessionSummary::from(&session), flags.format)?;

    match outcome {
        AuthOutcome::Authenticated(user) => {
            tracing::info!(user = %user.id, role = %user.role, "signed in");
            Ok(())
        }
        AuthOutcome::Forbidden(user) => bail!(
            "signed in as {}, but role '{}' may not use the admin console",
            user.display_name(),
            user.role
        ),
        AuthOutcome::Unauthenticated => match session.error {
            Some(reason) => bail!("sign-in failed: {reason}"),
            None => bail!("sign-in failed"),
        },
    }
}

async fn obtain_code(ctx: &AppContext) -> anyhow::Result<String> {
    let oauth = &ctx.config.oauth;
    if !oauth.uses_loopback() {
        let url = ctx
            .identity()
            .google_login_url(oauth.redirect_uri.trim(), &oauth.platform);
        bail!(
            "auth login: oauth.redirect_uri points at {}; open {url} and rerun with --code <code>",
            oauth.redirect_uri.trim()
        );
    }

    let code = qc_auth::browser_flow::login_code(
        ctx.identity(),
        &oauth.platform,
        Duration::from_secs(oauth.callback_timeout_secs),
    )
    .await?;
    Ok(code)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use qc_auth::{MemoryTokenStore, TokenStorage};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::cli::OutputFormat;
    use crate::context::tests_support::memory_context;

    // {"sub":"5"}, unsigned
    const TOKEN_USER_5: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiI1In0.sig";

    fn flags() -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Raw,
            quiet: true,
            verbose: false,
        }
    }

    async fn serve_exchange(server: &MockServer, role: &str) {
        Mock::given(method("POST"))
            .and(path("/auth/mobile/exchange"))
            .and(body_json(json!({ "code": "abc" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": TOKEN_USER_5,
                "refresh_token": "r5",
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/core/users/5"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": 5, "role": role })),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn code_login_stores_tokens() {
        let server = MockServer::start().await;
        serve_exchange(&server, "moderator").await;
        let tokens = Arc::new(MemoryTokenStore::new());
        let ctx = memory_context(&server.uri(), tokens.clone());

        let args = AuthLoginArgs {
            code: Some("abc".into()),
        };
        handle(&args, &ctx, &flags()).await.unwrap();
        assert_eq!(tokens.get_token().as_deref(), Some(TOKEN_USER_5));
        assert!(ctx.session.snapshot().is_authenticated);
    }

    #[tokio::test]
    async fn forbidden_role_fails_but_stays_signed_in() {
        let server = MockServer::start().await;
        serve_exchange(&server, "user").await;
        let tokens = Arc::new(MemoryTokenStore::new());
        let ctx = memory_context(&server.uri(), tokens.clone());

        let args = AuthLoginArgs {
            code: Some("abc".into()),
        };
        let err = handle(&args, &ctx, &flags()).await.unwrap_err();
        assert!(err.to_string().contains("may not use the admin console"));
        assert!(tokens.get_token().is_some());
    }

    #[tokio::test]
    async fn empty_code_is_rejected_without_calls() {
        let server = MockServer::start().await;
        let ctx = memory_context(&server.uri(), Arc::new(MemoryTokenStore::new()));
        let args = AuthLoginArgs {
            code: Some("  ".into()),
        };
        assert!(handle(&args, &ctx, &flags()).await.is_err());
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }
}
