use clap::{Args, Subcommand};

/// Authentication commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AuthCommands {
    /// Sign in with Google (browser), or exchange an existing code.
    Login(AuthLoginArgs),
    /// Sign out and clear stored credentials.
    Logout,
    /// Revalidate the stored session and show it.
    Status,
    /// Print the Google sign-in URL for the configured redirect.
    Url,
}

#[derive(Clone, Debug, Args)]
pub struct AuthLoginArgs {
    /// Authorization code obtained out of band; skips the browser.
    #[arg(long)]
    pub code: Option<String>,
}
