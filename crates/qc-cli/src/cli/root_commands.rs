use clap::Subcommand;

use crate::cli::subcommands::{
    AccessCommands, AuthCommands, CreatorCommands, QuestCommands, UserCommands,
};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Sign in, sign out, inspect the session.
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },
    /// Check what the signed-in role may see and do.
    Access {
        #[command(subcommand)]
        action: AccessCommands,
    },
    /// Platform user management.
    Users {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// Creator management.
    Creators {
        #[command(subcommand)]
        action: CreatorCommands,
    },
    /// Quest management.
    Quests {
        #[command(subcommand)]
        action: QuestCommands,
    },
}
