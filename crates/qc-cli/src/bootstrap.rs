use anyhow::Context;
use qc_config::ConsoleConfig;

/// Load `.env`, then the layered console configuration.
pub fn load_config() -> anyhow::Result<ConsoleConfig> {
    ConsoleConfig::load_with_dotenv().context("failed to load qcon configuration")
}
