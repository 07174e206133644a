use anyhow::bail;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct AuthUrlResponse {
    url: String,
    redirect_uri: String,
    platform: String,
}

pub fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let oauth = &ctx.config.oauth;
    let redirect_uri = oauth.redirect_uri.trim();
    if redirect_uri.is_empty() {
        bail!(
            "auth url: oauth.redirect_uri is not set (QCON_OAUTH__REDIRECT_URI); `qcon auth login` picks a loopback redirect itself"
        );
    }

    output(
        &AuthUrlResponse {
            url: ctx.identity().google_login_url(redirect_uri, &oauth.platform),
            redirect_uri: redirect_uri.to_string(),
            platform: oauth.platform.clone(),
        },
        flags.format,
    )
}
