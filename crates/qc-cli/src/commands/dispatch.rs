use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Auth { action } => commands::auth::handle(&action, ctx, flags).await,
        Commands::Access { action } => commands::access::handle(&action, ctx, flags).await,
        Commands::Users { action } => commands::users::handle(&action, ctx, flags).await,
        Commands::Creators { action } => commands::creators::handle(&action, ctx, flags).await,
        Commands::Quests { action } => commands::quests::handle(&action, ctx, flags).await,
    }
}
