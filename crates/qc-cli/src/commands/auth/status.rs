use serde::Serialize;

use super::SessionSummary;
use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct AuthStatusResponse {
    #[serde(flatten)]
    session: SessionSummary,
    expires_at: Option<String>,
    token_source: Option<&'static str>,
}

/// Revalidate and report. Never fails on an unauthenticated session.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    ctx.session.check_auth().await;
    let session = ctx.session.snapshot();

    let expires_at = ctx
        .session
        .access_token()
        .and_then(|token| qc_auth::claims::decode(&token).ok())
        .and_then(|claims| claims.expires_at)
        .map(|exp| exp.to_rfc3339());

    output(
        &AuthStatusResponse {
            session: SessionSummary::from(&session),
            expires_at,
            token_source: ctx.token_source(),
        },
        flags.format,
    )
}
