//! User roles.
//!
//! Stored as lowercase text (`"admin"`, `"basic"`) and embedded in access
//! token claims with the same spelling.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_BASIC: &str = "basic";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Basic,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Basic => ROLE_BASIC,
        }
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    /// Parse a role name. Matching is exact: `"Admin"` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_BASIC => Ok(Role::Basic),
            _ => Err(CoreError::InvalidRole),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parses_known_roles() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("basic".parse::<Role>().unwrap(), Role::Basic);
    }

    #[test]
    fn rejects_unknown_and_miscased_roles() {
        assert_matches!("root".parse::<Role>(), Err(CoreError::InvalidRole));
        assert_matches!("Admin".parse::<Role>(), Err(CoreError::InvalidRole));
        assert_matches!("".parse::<Role>(), Err(CoreError::InvalidRole));
    }

    #[test]
    fn default_is_basic() {
        assert_eq!(Role::default(), Role::Basic);
    }

    #[test]
    fn display_round_trips_through_parse() {
        for role in [Role::Admin, Role::Basic] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }
}
