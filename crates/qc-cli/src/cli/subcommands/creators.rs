use clap::Subcommand;

use super::ListArgs;

/// Creator commands.
#[derive(Clone, Debug, Subcommand)]
pub enum CreatorCommands {
    /// List creators.
    List(ListArgs),
}
