//! Platform roles.
//!
//! Roles are a closed set and deliberately not ordered: `finance` and
//! `moderator` hold disjoint privileges, so every surface names its own
//! allow-list instead of comparing ranks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Creator,
    Moderator,
    Finance,
    Admin,
    SuperAdmin,
}

impl Role {
    pub const ALL: [Self; 6] = [
        Self::User,
        Self::Creator,
        Self::Moderator,
        Self::Finance,
        Self::Admin,
        Self::SuperAdmin,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Creator => "creator",
            Self::Moderator => "moderator",
            Self::Finance => "finance",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// Whether this role appears in `allowlist`.
    #[must_use]
    pub fn is_in(self, allowlist: &[Self]) -> bool {
        allowlist.contains(&self)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| CoreError::UnknownRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_role_from_its_wire_name() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
    }

    #[test]
    fn parse_accepts_kebab_and_mixed_case() {
        assert_eq!("Super-Admin".parse::<Role>(), Ok(Role::SuperAdmin));
        assert_eq!(" FINANCE ".parse::<Role>(), Ok(Role::Finance));
    }

    #[test]
    fn parse_rejects_unknown_role() {
        let err = "owner".parse::<Role>().unwrap_err();
        assert_eq!(err, CoreError::UnknownRole("owner".into()));
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&Role::SuperAdmin).unwrap();
        assert_eq!(json, "\"super_admin\"");
        let parsed: Role = serde_json::from_str("\"moderator\"").unwrap();
        assert_eq!(parsed, Role::Moderator);
    }

    #[test]
    fn unknown_role_fails_to_deserialize() {
        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
    }

    #[test]
    fn is_in_checks_membership_only() {
        let list = [Role::Finance, Role::Admin];
        assert!(Role::Finance.is_in(&list));
        assert!(!Role::SuperAdmin.is_in(&list));
        assert!(!Role::User.is_in(&[]));
    }
}
