//! Actions and grant sets

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// What a user wants to do with a topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Read the topic and see it in navigation
    View,
    /// Change content, subtopics and attachments
    Edit,
}

impl Action {
    /// Every action
    pub const ALL: [Action; 2] = [Action::View, Action::Edit];

    /// Lowercase name as stored on disk
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "view" => Ok(Self::View),
            "edit" => Ok(Self::Edit),
            other => Err(format!("unknown action: {other}")),
        }
    }
}

/// Set of actions granted on one path
///
/// Serialized as a sorted list (`["view", "edit"]`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionSet(BTreeSet<Action>);

impl ActionSet {
    /// Empty set
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Both view and edit
    #[must_use]
    pub fn all() -> Self {
        Self::from(Action::ALL)
    }

    /// Check membership
    #[inline]
    #[must_use]
    pub fn contains(&self, action: Action) -> bool {
        self.0.contains(&action)
    }

    /// Add an action
    pub fn insert(&mut self, action: Action) -> bool {
        self.0.insert(action)
    }

    /// Drop an action
    pub fn remove(&mut self, action: Action) -> bool {
        self.0.remove(&action)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Actions in canonical order
    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        self.0.iter().copied()
    }
}

impl<const N: usize> From<[Action; N]> for ActionSet {
    fn from(actions: [Action; N]) -> Self {
        Self(actions.into_iter().collect())
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Display for ActionSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Action::as_str).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_parse() {
        assert_eq!("View".parse::<Action>().unwrap(), Action::View);
        assert_eq!(" edit ".parse::<Action>().unwrap(), Action::Edit);
        assert!("delete".parse::<Action>().is_err());
    }

    #[test]
    fn action_set_serializes_as_sorted_list() {
        let set = ActionSet::from([Action::Edit, Action::View]);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["view","edit"]"#);
        assert_eq!(set.to_string(), "[view, edit]");

        let back: ActionSet = serde_json::from_str(r#"["edit"]"#).unwrap();
        assert!(back.contains(Action::Edit));
        assert!(!back.contains(Action::View));
    }
}
