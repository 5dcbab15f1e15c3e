//! Root-level topic visibility
//!
//! Hides top-level topics from navigation. It is not access control: a hidden
//! topic still resolves when addressed directly.

use crate::path::TopicPath;
use crate::references::PathReferences;
use crate::tree::ContentTree;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Top-level topic name → visible flag (absent means visible)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisibilityConfig(IndexMap<String, bool>);

impl VisibilityConfig {
    /// Everything visible
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a top-level topic is shown in navigation
    #[inline]
    #[must_use]
    pub fn is_visible(&self, topic: &str) -> bool {
        self.0.get(topic).copied().unwrap_or(true)
    }

    /// Show or hide a top-level topic
    pub fn set(&mut self, topic: impl Into<String>, visible: bool) {
        self.0.insert(topic.into(), visible);
    }

    /// Explicit entries
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Record every top-level topic without an entry as visible
    ///
    /// Entries for names that are no longer top-level topics are dropped.
    pub fn reconcile(&mut self, tree: &ContentTree) {
        let Ok(root) = tree.node(tree.root()) else {
            return;
        };
        self.0.retain(|name, _| tree.child(tree.root(), name).is_some());
        for &id in root.children() {
            if let Ok(node) = tree.node(id) {
                self.0.entry(node.name().to_string()).or_insert(true);
            }
        }
    }
}

impl PathReferences for VisibilityConfig {
    fn path_renamed(&mut self, from: &TopicPath, to: &TopicPath) {
        if from.len() != 1 {
            return;
        }
        if let (Some(old), Some(new)) = (from.name(), to.name()) {
            if let Some(visible) = self.0.shift_remove(old) {
                self.0.insert(new.to_string(), visible);
            }
        }
    }

    fn path_removed(&mut self, path: &TopicPath) {
        if path.len() == 1 {
            if let Some(name) = path.name() {
                self.0.shift_remove(name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_entries_are_visible() {
        let mut vis = VisibilityConfig::new();
        assert!(vis.is_visible("X"));
        vis.set("Y", false);
        assert!(!vis.is_visible("Y"));
    }

    #[test]
    fn rename_carries_flag() {
        let mut vis = VisibilityConfig::new();
        vis.set("Old", false);
        vis.path_renamed(&TopicPath::single("Old"), &TopicPath::single("New"));
        assert!(!vis.is_visible("New"));
        assert!(vis.is_visible("Old"));
    }

    #[test]
    fn nested_changes_ignored() {
        let mut vis = VisibilityConfig::new();
        vis.set("Sub", false);
        vis.path_removed(&TopicPath::from(["Top", "Sub"]));
        assert!(!vis.is_visible("Sub"));
    }
}
