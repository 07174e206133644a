use clap::{Args, Subcommand};

use super::ListArgs;

/// Quest commands.
#[derive(Clone, Debug, Subcommand)]
pub enum QuestCommands {
    /// List quests.
    List(ListArgs),
    /// Delete a quest.
    Delete(QuestIdArgs),
}

#[derive(Clone, Debug, Args)]
pub struct QuestIdArgs {
    /// Quest id.
    pub id: String,
}
