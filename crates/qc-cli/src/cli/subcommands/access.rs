use clap::{Args, Subcommand};
use qc_core::{Action, Page};

/// Access inspection commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AccessCommands {
    /// Evaluate the route guard, a page check and optionally an action check.
    Check(AccessCheckArgs),
}

#[derive(Clone, Debug, Args)]
pub struct AccessCheckArgs {
    /// Page: dashboard, users, creators, quests, statistics.
    pub page: Page,
    /// Mutation to check as well (e.g. delete_quest).
    #[arg(long)]
    pub action: Option<Action>,
}
