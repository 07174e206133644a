//! Allow-lists for console surfaces.
//!
//! [`MINIMUM_ALLOWLIST`] decides who may enter the console shell at all, and
//! each [`Page`] / [`Action`] names the narrower set it needs. Pages are checked at render time, actions again at the moment
//! the mutation is invoked.
//!
//! ```text
//!                       user creator moderator finance admin super_admin
//! shell (minimum)                       x        x      x       x
//! dashboard                             x        x      x       x
//! users                                                 x       x
//! creators                              x        x      x       x
//! quests                                x               x       x
//! statistics                                     x      x       x
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::role::Role;

/// Roles permitted to reach any admin surface.
pub const MINIMUM_ALLOWLIST: &[Role] = &[
    Role::Admin,
    Role::SuperAdmin,
    Role::Moderator,
    Role::Finance,
];

const ADMINS: &[Role] = &[Role::Admin, Role::SuperAdmin];
const ADMINS_AND_MODERATORS: &[Role] = &[Role::Admin, Role::SuperAdmin, Role::Moderator];
const ADMINS_AND_FINANCE: &[Role] = &[Role::Admin, Role::SuperAdmin, Role::Finance];

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// A protected console page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Dashboard,
    Users,
    Creators,
    Quests,
    Statistics,
}

impl Page {
    pub const ALL: [Self; 5] = [
        Self::Dashboard,
        Self::Users,
        Self::Creators,
        Self::Quests,
        Self::Statistics,
    ];

    /// Roles allowed to view the page.
    #[must_use]
    pub const fn view_roles(self) -> &'static [Role] {
        match self {
            Self::Dashboard | Self::Creators => MINIMUM_ALLOWLIST,
            Self::Users => ADMINS,
            Self::Quests => ADMINS_AND_MODERATORS,
            Self::Statistics => ADMINS_AND_FINANCE,
        }
    }

    /// Explanation shown in the access-denied panel.
    #[must_use]
    pub const fn denied_message(self) -> &'static str {
        match self {
            Self::Dashboard => "You do not have access to the admin dashboard.",
            Self::Users => "User management is available to administrators only.",
            Self::Creators => "Creator management requires a staff role.",
            Self::Quests => "Quest management is available to administrators and moderators.",
            Self::Statistics => "Statistics are available to administrators and finance.",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Users => "users",
            Self::Creators => "creators",
            Self::Quests => "quests",
            Self::Statistics => "statistics",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Page {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|page| page.as_str() == normalized)
            .ok_or_else(|| CoreError::UnknownPage(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// A mutating operation. Read access to the owning page does not imply it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    DeleteUser,
    ChangeUserRole,
    ChangeUserStatus,
    EditPayout,
    ChangeCreatorVerification,
    DeleteQuest,
    ChangeQuestStatus,
    ExportStatistics,
}

impl Action {
    pub const ALL: [Self; 8] = [
        Self::DeleteUser,
        Self::ChangeUserRole,
        Self::ChangeUserStatus,
        Self::EditPayout,
        Self::ChangeCreatorVerification,
        Self::DeleteQuest,
        Self::ChangeQuestStatus,
        Self::ExportStatistics,
    ];

    /// Roles allowed to perform the action.
    #[must_use]
    pub const fn allowed_roles(self) -> &'static [Role] {
        match self {
            Self::DeleteUser | Self::ChangeUserRole | Self::ChangeUserStatus | Self::DeleteQuest => {
                ADMINS
            }
            Self::EditPayout | Self::ExportStatistics => ADMINS_AND_FINANCE,
            Self::ChangeCreatorVerification | Self::ChangeQuestStatus => ADMINS_AND_MODERATORS,
        }
    }

    /// The page the action belongs to.
    #[must_use]
    pub const fn page(self) -> Page {
        match self {
            Self::DeleteUser | Self::ChangeUserRole | Self::ChangeUserStatus => Page::Users,
            Self::EditPayout | Self::ChangeCreatorVerification => Page::Creators,
            Self::DeleteQuest | Self::ChangeQuestStatus => Page::Quests,
            Self::ExportStatistics => Page::Statistics,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeleteUser => "delete_user",
            Self::ChangeUserRole => "change_user_role",
            Self::ChangeUserStatus => "change_user_status",
            Self::EditPayout => "edit_payout",
            Self::ChangeCreatorVerification => "change_creator_verification",
            Self::DeleteQuest => "delete_quest",
            Self::ChangeQuestStatus => "change_quest_status",
            Self::ExportStatistics => "export_statistics",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == normalized)
            .ok_or_else(|| CoreError::UnknownAction(s.to_string()))
    }
}
