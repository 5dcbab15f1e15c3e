//! Access resolution over accounts and grants

use crate::action::Action;
use crate::error::{AccessError, AccessResult};
use crate::privilege::PrivilegeTable;
use crate::user::{UserAccount, UserDirectory};
use kbase_tree::TopicPath;

/// Read-only view combining the user directory with the privilege table
///
/// The resolver is a pure query: the answer depends only on the current
/// grants, the user's role and the path.
#[derive(Debug, Clone, Copy)]
pub struct AccessResolver<'a> {
    users: &'a UserDirectory,
    privileges: &'a PrivilegeTable,
}

impl<'a> AccessResolver<'a> {
    #[must_use]
    pub fn new(users: &'a UserDirectory, privileges: &'a PrivilegeTable) -> Self {
        Self { users, privileges }
    }

    /// Decide whether `username` may perform `action` on `path`
    ///
    /// Unknown users are denied.
    #[must_use]
    pub fn authorize(&self, username: &str, path: &TopicPath, action: Action) -> bool {
        let allowed = self
            .account(username)
            .is_some_and(|account| self.privileges.authorize(account, path, action));
        tracing::debug!(user = username, path = %path, %action, allowed, "authorize");
        allowed
    }

    /// Like [`AccessResolver::authorize`], as a `Result`
    ///
    /// # Errors
    /// `Unauthorized` when access is denied
    pub fn require(&self, username: &str, path: &TopicPath, action: Action) -> AccessResult<()> {
        if self.authorize(username, path, action) {
            Ok(())
        } else {
            Err(AccessError::unauthorized(username, path, action))
        }
    }

    /// Whether `path` or anything below it is reachable with `action`
    #[must_use]
    pub fn can_reach(&self, username: &str, path: &TopicPath, action: Action) -> bool {
        self.account(username).is_some_and(|account| {
            account.role.is_admin() || self.privileges.has_grant_within(username, path, action)
        })
    }

    fn account(&self, username: &str) -> Option<&'a UserAccount> {
        self.users.get(username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ActionSet;

    #[test]
    fn unknown_user_denied_even_with_grants() {
        let users = UserDirectory::new();
        let mut privileges = PrivilegeTable::new();
        privileges.grant("ghost", TopicPath::single("A"), ActionSet::all());

        let resolver = AccessResolver::new(&users, &privileges);
        assert!(!resolver.authorize("ghost", &TopicPath::single("A"), Action::View));
        assert!(matches!(
            resolver.require("ghost", &TopicPath::single("A"), Action::View),
            Err(AccessError::Unauthorized { .. })
        ));
    }

    #[test]
    fn admin_needs_no_grants() {
        let users: UserDirectory = serde_json::from_value(serde_json::json!({
            "boss": { "password_hash": "x", "role": "Admin" }
        }))
        .unwrap();
        let privileges = PrivilegeTable::new();
        let resolver = AccessResolver::new(&users, &privileges);
        assert!(resolver.authorize("boss", &TopicPath::from(["A", "B"]), Action::Edit));
        assert!(resolver.can_reach("boss", &TopicPath::root(), Action::View));
    }
}
