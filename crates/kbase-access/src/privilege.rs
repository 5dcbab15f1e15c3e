//! Per-user privilege grants
//!
//! A grant on a path covers the whole subtree below it. There are no deny
//! entries; absence of a grant is the only way to withhold an action.

use crate::action::{Action, ActionSet};
use crate::user::UserAccount;
use kbase_tree::{PathReferences, TopicPath};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One stored grant: `{ "path": [..segments], "actions": [..] }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRecord {
    pub path: TopicPath,
    pub actions: ActionSet,
}

/// username → path → granted actions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Vec<GrantRecord>>", into = "BTreeMap<String, Vec<GrantRecord>>")]
pub struct PrivilegeTable {
    users: BTreeMap<String, BTreeMap<TopicPath, ActionSet>>,
}

impl From<BTreeMap<String, Vec<GrantRecord>>> for PrivilegeTable {
    fn from(records: BTreeMap<String, Vec<GrantRecord>>) -> Self {
        let mut table = Self::new();
        for (user, grants) in records {
            for record in grants {
                table.grant(&user, record.path, record.actions);
            }
        }
        table
    }
}

impl From<PrivilegeTable> for BTreeMap<String, Vec<GrantRecord>> {
    fn from(table: PrivilegeTable) -> Self {
        table
            .users
            .into_iter()
            .map(|(user, grants)| {
                let records = grants
                    .into_iter()
                    .map(|(path, actions)| GrantRecord { path, actions })
                    .collect();
                (user, records)
            })
            .collect()
    }
}

impl PrivilegeTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether `account` may perform `action` on `path`
    ///
    /// Admins are always authorized. Everyone else needs a grant on `path`
    /// itself or on one of its ancestors.
    #[must_use]
    pub fn authorize(&self, account: &UserAccount, path: &TopicPath, action: Action) -> bool {
        account.role.is_admin() || self.allows(&account.username, path, action)
    }

    /// Grant lookup without the role override
    ///
    /// Checks the exact path first, then each ancestor from the immediate
    /// parent upward. The root itself is never consulted as an ancestor.
    #[must_use]
    pub fn allows(&self, user: &str, path: &TopicPath, action: Action) -> bool {
        let Some(grants) = self.users.get(user) else {
            return false;
        };
        if grants.get(path).is_some_and(|set| set.contains(action)) {
            return true;
        }
        path.ancestors()
            .any(|ancestor| grants.get(&ancestor).is_some_and(|set| set.contains(action)))
    }

    /// Whether `user` holds `action` anywhere at or below `path`
    ///
    /// Used to keep ancestors of a granted topic navigable.
    #[must_use]
    pub fn has_grant_within(&self, user: &str, path: &TopicPath, action: Action) -> bool {
        if self.allows(user, path, action) {
            return true;
        }
        self.users.get(user).is_some_and(|grants| {
            grants
                .iter()
                .any(|(key, set)| path.is_prefix_of(key) && set.contains(action))
        })
    }

    /// Replace the grant set for an exact path
    ///
    /// An empty set removes the entry. Nothing is merged with the previous set.
    pub fn grant(&mut self, user: &str, path: TopicPath, actions: ActionSet) {
        tracing::info!(user, path = %path, actions = %actions, "grant replaced");
        if actions.is_empty() {
            if let Some(grants) = self.users.get_mut(user) {
                grants.remove(&path);
                if grants.is_empty() {
                    self.users.remove(user);
                }
            }
            return;
        }
        self.users
            .entry(user.to_string())
            .or_default()
            .insert(path, actions);
    }

    /// Exact grant set for a path, if any
    #[must_use]
    pub fn grant_for(&self, user: &str, path: &TopicPath) -> Option<&ActionSet> {
        self.users.get(user).and_then(|grants| grants.get(path))
    }

    /// Every grant held by `user`, sorted by path
    pub fn grants_for(&self, user: &str) -> impl Iterator<Item = (&TopicPath, &ActionSet)> {
        self.users.get(user).into_iter().flatten()
    }

    /// Users with at least one grant
    pub fn users(&self) -> impl Iterator<Item = &str> {
        self.users.keys().map(String::as_str)
    }

    /// Drop every grant of a user
    pub fn revoke_user(&mut self, user: &str) -> bool {
        let removed = self.users.remove(user).is_some();
        if removed {
            tracing::info!(user, "grants revoked");
        }
        removed
    }

    /// Keep only grants whose path satisfies `keep`
    ///
    /// Returns how many grants were dropped.
    pub fn retain_paths(&mut self, mut keep: impl FnMut(&TopicPath) -> bool) -> usize {
        let mut dropped = 0;
        for grants in self.users.values_mut() {
            let before = grants.len();
            grants.retain(|path, _| keep(path));
            dropped += before - grants.len();
        }
        self.users.retain(|_, grants| !grants.is_empty());
        dropped
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl PathReferences for PrivilegeTable {
    fn path_renamed(&mut self, from: &TopicPath, to: &TopicPath) {
        for grants in self.users.values_mut() {
            let moved: Vec<TopicPath> = grants
                .keys()
                .filter(|key| from.is_prefix_of(key))
                .cloned()
                .collect();
            for key in moved {
                if let (Some(set), Some(new_key)) = (grants.remove(&key), key.rebase(from, to)) {
                    grants.insert(new_key, set);
                }
            }
        }
    }

    fn path_removed(&mut self, path: &TopicPath) {
        for grants in self.users.values_mut() {
            grants.retain(|key, _| !path.is_prefix_of(key));
        }
        self.users.retain(|_, grants| !grants.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;
    use pretty_assertions::assert_eq;

    fn account(name: &str, role: Role) -> UserAccount {
        UserAccount::new(name, "", role)
    }

    #[test]
    fn exact_and_inherited_grants() {
        let mut table = PrivilegeTable::new();
        table.grant("ravi", TopicPath::single("Topic"), ActionSet::from([Action::View]));

        let sub = TopicPath::from(["Topic", "Sub"]);
        assert!(table.allows("ravi", &TopicPath::single("Topic"), Action::View));
        assert!(table.allows("ravi", &sub, Action::View));
        assert!(!table.allows("ravi", &sub, Action::Edit));
        assert!(!table.allows("ravi", &TopicPath::root(), Action::View));
    }

    #[test]
    fn admin_override_on_empty_table() {
        let table = PrivilegeTable::new();
        let admin = account("admin", Role::Admin);
        assert!(table.authorize(&admin, &TopicPath::from(["Any", "Where"]), Action::Edit));
        assert!(table.authorize(&admin, &TopicPath::root(), Action::View));
    }

    #[test]
    fn unknown_user_denied() {
        let table = PrivilegeTable::new();
        assert!(!table.authorize(
            &account("ghost", Role::User),
            &TopicPath::single("A"),
            Action::View
        ));
    }

    #[test]
    fn grant_replaces_rather_than_merges() {
        let mut table = PrivilegeTable::new();
        let path = TopicPath::single("A");
        table.grant("ravi", path.clone(), ActionSet::all());
        table.grant("ravi", path.clone(), ActionSet::from([Action::Edit]));
        assert!(!table.allows("ravi", &path, Action::View));

        table.grant("ravi", path.clone(), ActionSet::new());
        assert_eq!(table.grant_for("ravi", &path), None);
        assert!(table.is_empty());
    }

    #[test]
    fn removal_is_segment_wise() {
        let mut table = PrivilegeTable::new();
        table.grant("ravi", TopicPath::single("Topic"), ActionSet::all());
        table.grant("ravi", TopicPath::from(["Topic", "Sub"]), ActionSet::all());
        table.grant("ravi", TopicPath::single("Topic2"), ActionSet::all());

        table.path_removed(&TopicPath::single("Topic"));

        let left: Vec<String> = table.grants_for("ravi").map(|(p, _)| p.to_string()).collect();
        assert_eq!(left, vec!["Topic2"]);
    }

    #[test]
    fn rename_rewrites_descendant_grants() {
        let mut table = PrivilegeTable::new();
        table.grant("ravi", TopicPath::from(["A", "x"]), ActionSet::from([Action::Edit]));
        table.grant("ravi", TopicPath::single("AB"), ActionSet::from([Action::View]));

        table.path_renamed(&TopicPath::single("A"), &TopicPath::single("B"));

        assert!(table.allows("ravi", &TopicPath::from(["B", "x"]), Action::Edit));
        assert!(!table.allows("ravi", &TopicPath::from(["A", "x"]), Action::Edit));
        assert!(table.allows("ravi", &TopicPath::single("AB"), Action::View));
    }

    #[test]
    fn grant_within_sees_descendants() {
        let mut table = PrivilegeTable::new();
        table.grant("ravi", TopicPath::from(["A", "x"]), ActionSet::from([Action::View]));
        assert!(table.has_grant_within("ravi", &TopicPath::single("A"), Action::View));
        assert!(table.has_grant_within("ravi", &TopicPath::root(), Action::View));
        assert!(!table.has_grant_within("ravi", &TopicPath::single("B"), Action::View));
        assert!(!table.has_grant_within("ravi", &TopicPath::single("A"), Action::Edit));
    }

    #[test]
    fn stored_as_records() {
        let mut table = PrivilegeTable::new();
        table.grant("ravi", TopicPath::from(["A", "x"]), ActionSet::from([Action::View]));
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "ravi": [ { "path": ["A", "x"], "actions": ["view"] } ] })
        );
        let back: PrivilegeTable = serde_json::from_value(json).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn retain_paths_prunes_and_forgets_empty_users() {
        let mut table = PrivilegeTable::new();
        table.grant("ravi", TopicPath::single("Kept"), ActionSet::all());
        table.grant("ravi", TopicPath::from(["Gone", "x"]), ActionSet::all());
        table.grant("meena", TopicPath::single("Gone"), ActionSet::from([Action::View]));

        let gone = TopicPath::single("Gone");
        assert_eq!(table.retain_paths(|path| !gone.is_prefix_of(path)), 2);
        assert_eq!(table.users().collect::<Vec<_>>(), vec!["ravi"]);
        assert!(table.allows("ravi", &TopicPath::single("Kept"), Action::Edit));
    }
}
