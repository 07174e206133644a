use clap::{Args, Subcommand};
use qc_core::Role;

use super::ListArgs;

/// Platform user commands.
#[derive(Clone, Debug, Subcommand)]
pub enum UserCommands {
    /// List users.
    List(ListArgs),
    /// Change a user's role.
    SetRole(UserSetRoleArgs),
    /// Delete a user.
    Delete(UserIdArgs),
}

#[derive(Clone, Debug, Args)]
pub struct UserSetRoleArgs {
    /// User id.
    pub id: String,
    /// New role: user, creator, moderator, finance, admin, super_admin.
    pub role: Role,
}

#[derive(Clone, Debug, Args)]
pub struct UserIdArgs {
    /// User id.
    pub id: String,
}
