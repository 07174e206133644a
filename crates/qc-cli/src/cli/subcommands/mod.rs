pub mod access;
pub mod auth;
pub mod creators;
pub mod quests;
pub mod users;

pub use access::AccessCommands;
pub use auth::AuthCommands;
pub use creators::CreatorCommands;
pub use quests::QuestCommands;
pub use users::UserCommands;

use clap::Args;

/// Paging arguments shared by list commands.
#[derive(Clone, Debug, Args)]
pub struct ListArgs {
    /// Max rows to request (defaults to `general.default_limit`).
    #[arg(long)]
    pub limit: Option<u32>,
}
