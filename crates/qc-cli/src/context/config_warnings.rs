use qc_config::ConsoleConfig;

/// Warn about `QCON_*` variables that look set but did not reach the config.
pub fn warn_unconfigured(config: &ConsoleConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &ConsoleConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();

    let mut warnings = Vec::new();

    if !config.api.is_configured() && has_env_prefix(&env_keys, "QCON_API") {
        warnings.push(
            "API config appears default while QCON_API* env vars exist. Use double underscores (example: QCON_API__BASE_URL)."
                .to_string(),
        );
    }

    if config.oauth.redirect_uri.is_empty() && has_env_prefix(&env_keys, "QCON_OAUTH_") {
        warnings.push(
            "OAuth config appears default while QCON_OAUTH_* env vars exist. Use double underscores (example: QCON_OAUTH__REDIRECT_URI)."
                .to_string(),
        );
    }

    warnings
}

fn has_env_prefix(keys: &[String], prefix: &str) -> bool {
    keys.iter().any(|key| key.starts_with(prefix))
}
