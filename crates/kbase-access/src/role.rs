//! Account roles

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Role of an account
///
/// Only `Admin` changes authorization. `Editor` additionally manages the
/// announcement feed; topic edits still need grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    /// Bypasses every privilege check
    Admin,
    /// Manages announcements
    #[serde(alias = "Report Manager")]
    Editor,
    /// Plain reader
    #[default]
    User,
}

impl Role {
    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// May post and delete announcements
    #[must_use]
    pub fn manages_announcements(self) -> bool {
        matches!(self, Self::Admin | Self::Editor)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Editor => "Editor",
            Self::User => "User",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "editor" | "report manager" => Ok(Self::Editor),
            "user" => Ok(Self::User),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_role_name_accepted() {
        let role: Role = serde_json::from_str(r#""Report Manager""#).unwrap();
        assert_eq!(role, Role::Editor);
        assert_eq!(serde_json::to_string(&role).unwrap(), r#""Editor""#);
        assert_eq!("report manager".parse::<Role>().unwrap(), Role::Editor);
    }

    #[test]
    fn only_admin_and_editor_manage_announcements() {
        assert!(Role::Admin.manages_announcements());
        assert!(Role::Editor.manages_announcements());
        assert!(!Role::User.manages_announcements());
    }
}
