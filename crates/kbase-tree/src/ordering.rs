//! Display ordering of children
//!
//! One ordered name list per parent. The root list is the topic order; every
//! other list is keyed by the full path of its parent.

use crate::path::TopicPath;
use crate::references::PathReferences;
use crate::tree::ContentTree;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-parent ordering lists
///
/// Lists may hold stale names (children that were deleted); those are
/// skipped when arranging, never treated as errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OrderingRepr", into = "OrderingRepr")]
pub struct OrderingConfig {
    lists: BTreeMap<TopicPath, Vec<String>>,
}

/// On-disk shape: root list plus `(parent, order)` records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct OrderingRepr {
    #[serde(default)]
    topic_order: Vec<String>,
    #[serde(default)]
    subtopic_order: Vec<SubtopicOrder>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SubtopicOrder {
    parent: TopicPath,
    order: Vec<String>,
}

impl From<OrderingRepr> for OrderingConfig {
    fn from(repr: OrderingRepr) -> Self {
        let mut lists = BTreeMap::new();
        if !repr.topic_order.is_empty() {
            lists.insert(TopicPath::root(), repr.topic_order);
        }
        for entry in repr.subtopic_order {
            if !entry.parent.is_root() {
                lists.insert(entry.parent, entry.order);
            }
        }
        Self { lists }
    }
}

impl From<OrderingConfig> for OrderingRepr {
    fn from(config: OrderingConfig) -> Self {
        let mut repr = OrderingRepr::default();
        for (parent, order) in config.lists {
            if parent.is_root() {
                repr.topic_order = order;
            } else {
                repr.subtopic_order.push(SubtopicOrder { parent, order });
            }
        }
        repr
    }
}

impl OrderingConfig {
    /// Empty configuration (insertion order everywhere)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordering list for `parent` (empty if none configured)
    #[must_use]
    pub fn order_for(&self, parent: &TopicPath) -> &[String] {
        self.lists.get(parent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace the ordering list for `parent`
    pub fn set_order(&mut self, parent: TopicPath, order: Vec<String>) {
        if order.is_empty() {
            self.lists.remove(&parent);
        } else {
            self.lists.insert(parent, order);
        }
    }

    /// Parents that have an ordering list
    pub fn parents(&self) -> impl Iterator<Item = &TopicPath> {
        self.lists.keys()
    }

    /// Arrange `items` (children of `parent`) for display
    ///
    /// Listed names come first in list order; everything else follows in the
    /// order it was given. Stale and repeated list entries are ignored.
    pub fn arrange<T, F>(&self, parent: &TopicPath, items: Vec<T>, name_of: F) -> Vec<T>
    where
        F: Fn(&T) -> &str,
    {
        let order = self.order_for(parent);
        if order.is_empty() {
            return items;
        }

        let mut pending: Vec<Option<T>> = items.into_iter().map(Some).collect();
        let mut arranged = Vec::with_capacity(pending.len());
        for wanted in order {
            let slot = pending
                .iter_mut()
                .find(|slot| slot.as_ref().is_some_and(|item| name_of(item) == wanted));
            if let Some(item) = slot.and_then(Option::take) {
                arranged.push(item);
            }
        }
        arranged.extend(pending.into_iter().flatten());
        arranged
    }

    /// Append every child missing from its parent's list
    ///
    /// Only parents that have children get a list. Lists keyed by a parent
    /// that no longer resolves are dropped.
    pub fn reconcile(&mut self, tree: &ContentTree) {
        let before = self.lists.len();
        self.lists.retain(|parent, _| tree.resolve(parent).is_ok());
        if self.lists.len() != before {
            tracing::debug!(dropped = before - self.lists.len(), "stale ordering lists dropped");
        }
        let parents = std::iter::once(tree.root()).chain(tree.descendants(tree.root()));
        for id in parents {
            let (Ok(node), Ok(path)) = (tree.node(id), tree.path_of(id)) else {
                continue;
            };
            if node.children().is_empty() {
                continue;
            }
            let list = self.lists.entry(path).or_default();
            for &child in node.children() {
                if let Ok(child) = tree.node(child) {
                    if !list.iter().any(|n| n.as_str() == child.name()) {
                        list.push(child.name().to_string());
                    }
                }
            }
        }
    }
}

impl PathReferences for OrderingConfig {
    fn path_added(&mut self, path: &TopicPath) {
        let (Some(parent), Some(name)) = (path.parent(), path.name()) else {
            return;
        };
        let list = self.lists.entry(parent).or_default();
        if !list.iter().any(|n| n.as_str() == name) {
            list.push(name.to_string());
        }
    }

    fn path_renamed(&mut self, from: &TopicPath, to: &TopicPath) {
        if let (Some(parent), Some(old), Some(new)) = (from.parent(), from.name(), to.name()) {
            if let Some(list) = self.lists.get_mut(&parent) {
                list.retain(|n| n.as_str() != new);
                for entry in list.iter_mut().filter(|n| n.as_str() == old) {
                    *entry = new.to_string();
                }
            }
        }

        let moved: Vec<TopicPath> = self
            .lists
            .keys()
            .filter(|key| from.is_prefix_of(key))
            .cloned()
            .collect();
        for key in moved {
            if let (Some(list), Some(new_key)) = (self.lists.remove(&key), key.rebase(from, to)) {
                self.lists.insert(new_key, list);
            }
        }
    }

    fn path_removed(&mut self, path: &TopicPath) {
        if let (Some(parent), Some(name)) = (path.parent(), path.name()) {
            if let Some(list) = self.lists.get_mut(&parent) {
                list.retain(|n| n.as_str() != name);
            }
        }
        self.lists.retain(|key, _| !path.is_prefix_of(key));
    }
}
