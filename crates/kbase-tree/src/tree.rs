//! Arena-backed content tree
//!
//! Nodes live in a flat arena and refer to each other by [`NodeId`]. Parent to
//! child edges are ordered id lists, so renaming a topic touches one node and
//! never copies a subtree.

use crate::error::{TreeError, TreeResult};
use crate::node::{NodeId, TopicNode};
use crate::ordering::OrderingConfig;
use crate::path::TopicPath;
use crate::references::PathReferences;
use crate::search::Search;
use crate::visibility::VisibilityConfig;

/// Child of a node as projected for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildEntry<'a> {
    /// Child name
    pub name: &'a str,
    /// Child id
    pub id: NodeId,
}

/// The topic hierarchy
#[derive(Debug, Clone)]
pub struct ContentTree {
    /// Arena slots; removed nodes leave `None` behind
    slots: Vec<Option<TopicNode>>,
    /// Number of live nodes, root excluded
    live: usize,
}

impl ContentTree {
    /// Create a tree containing only the root
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: vec![Some(TopicNode::new("", None, None))],
            live: 0,
        }
    }

    /// Id of the root node
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of topics, root excluded
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check whether the tree has no topics
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Look up a node by id
    ///
    /// # Errors
    /// `UnknownNode` if the id was removed or never issued
    pub fn node(&self, id: NodeId) -> TreeResult<&TopicNode> {
        self.slots
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(TreeError::UnknownNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> TreeResult<&mut TopicNode> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(TreeError::UnknownNode(id))
    }

    /// Find a direct child by exact name
    #[must_use]
    pub fn child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        let node = self.node(parent).ok()?;
        node.children
            .iter()
            .copied()
            .find(|&c| self.node(c).is_ok_and(|n| n.name == name))
    }

    /// Walk from the root following each segment
    ///
    /// # Errors
    /// `PathNotFound` if any segment is absent
    pub fn resolve(&self, path: &TopicPath) -> TreeResult<NodeId> {
        let mut current = self.root();
        for segment in path.iter() {
            current = self
                .child(current, segment)
                .ok_or_else(|| TreeError::PathNotFound(path.clone()))?;
        }
        tracing::trace!(path = %path, node = %current, "resolved");
        Ok(current)
    }

    /// Full path of a node
    ///
    /// # Errors
    /// `UnknownNode` if the id is not live
    pub fn path_of(&self, id: NodeId) -> TreeResult<TopicPath> {
        let mut segments = Vec::new();
        let mut current = self.node(id)?;
        while let Some(parent) = current.parent {
            segments.push(current.name.clone());
            current = self.node(parent)?;
        }
        segments.reverse();
        Ok(TopicPath::new(segments))
    }

    /// Children of `parent` in display order
    ///
    /// Children follow the parent's ordering list; any child missing from it
    /// is appended in insertion order and stale names in the list are
    /// skipped. At the root, topics whose visibility is `false` are omitted.
    /// Visibility never affects [`ContentTree::resolve`].
    ///
    /// # Errors
    /// `UnknownNode` if `parent` is not live
    pub fn list_children<'a>(
        &'a self,
        parent: NodeId,
        ordering: &OrderingConfig,
        visibility: &VisibilityConfig,
    ) -> TreeResult<Vec<ChildEntry<'a>>> {
        let is_root = parent == self.root();
        let parent_path = self.path_of(parent)?;

        let mut entries = Vec::with_capacity(self.node(parent)?.children.len());
        for &id in &self.node(parent)?.children {
            let name = self.node(id)?.name.as_str();
            if is_root && !visibility.is_visible(name) {
                continue;
            }
            entries.push(ChildEntry { name, id });
        }

        Ok(ordering.arrange(&parent_path, entries, |e| e.name))
    }

    /// Create an empty child topic
    ///
    /// The new name is reported to `refs`, which appends it to the parent's
    /// ordering list.
    ///
    /// # Errors
    /// - `InvalidName` for blank names
    /// - `DuplicateName` if a sibling already has the name (tree unchanged)
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: &str,
        icon: Option<&str>,
        refs: &mut dyn PathReferences,
    ) -> TreeResult<NodeId> {
        let id = self.attach(parent, name, icon)?;
        let path = self.path_of(id)?;
        refs.path_added(&path);
        tracing::info!(path = %path, node = %id, "topic added");
        Ok(id)
    }

    /// Insert a child without notifying anyone
    pub(crate) fn attach(&mut self, parent: NodeId, name: &str, icon: Option<&str>) -> TreeResult<NodeId> {
        validate_name(name)?;
        if self.child(parent, name).is_some() {
            return Err(TreeError::duplicate(self.path_of(parent)?, name));
        }
        self.node(parent)?;

        let id = NodeId(self.slots.len());
        self.slots.push(Some(TopicNode::new(
            name,
            icon.map(str::to_string),
            Some(parent),
        )));
        self.node_mut(parent)?.children.push(id);
        self.live += 1;
        Ok(id)
    }

    /// Rename a child, keeping its id, content and subtree
    ///
    /// `refs` rewrites every entry keyed by the old path or a descendant of it;
    /// the new name keeps the old name's slot in the parent's ordering list.
    ///
    /// # Errors
    /// - `PathNotFound` if `old` is not a child of `parent`
    /// - `InvalidName` for a blank `new`
    /// - `DuplicateName` if `new` already exists
    pub fn rename_child(
        &mut self,
        parent: NodeId,
        old: &str,
        new: &str,
        refs: &mut dyn PathReferences,
    ) -> TreeResult<()> {
        let parent_path = self.path_of(parent)?;
        let from = parent_path.child(old);
        let id = self
            .child(parent, old)
            .ok_or_else(|| TreeError::PathNotFound(from.clone()))?;
        if old == new {
            return Ok(());
        }
        validate_name(new)?;
        if self.child(parent, new).is_some() {
            return Err(TreeError::duplicate(parent_path, new));
        }

        self.node_mut(id)?.name = new.to_string();

        let to = parent_path.child(new);
        refs.path_renamed(&from, &to);
        tracing::info!(from = %from, to = %to, "topic renamed");
        Ok(())
    }

    /// Delete a child and its whole subtree
    ///
    /// Returns the removed paths, the removed topic first, in pre-order.
    ///
    /// # Errors
    /// `PathNotFound` if `name` is not a child of `parent`
    pub fn remove_child(
        &mut self,
        parent: NodeId,
        name: &str,
        refs: &mut dyn PathReferences,
    ) -> TreeResult<Vec<TopicPath>> {
        let path = self.path_of(parent)?.child(name);
        let id = self
            .child(parent, name)
            .ok_or_else(|| TreeError::PathNotFound(path.clone()))?;

        let mut removed = Vec::new();
        let mut stack = vec![(id, path.clone())];
        while let Some((current, current_path)) = stack.pop() {
            let node = self.slots[current.0].take().ok_or(TreeError::UnknownNode(current))?;
            for &c in node.children.iter().rev() {
                let child_name = self.node(c)?.name.clone();
                stack.push((c, current_path.child(child_name)));
            }
            removed.push(current_path);
            self.live -= 1;
        }
        self.node_mut(parent)?.children.retain(|&c| c != id);

        refs.path_removed(&path);
        tracing::info!(path = %path, removed = removed.len(), "topic removed");
        Ok(removed)
    }

    /// Replace a node's content
    ///
    /// # Errors
    /// `UnknownNode` if the id is not live
    pub fn set_content(&mut self, id: NodeId, text: impl Into<String>) -> TreeResult<()> {
        self.node_mut(id)?.content = text.into();
        tracing::debug!(node = %id, "content replaced");
        Ok(())
    }

    /// Replace a node's icon
    ///
    /// # Errors
    /// `UnknownNode` if the id is not live
    pub fn set_icon(&mut self, id: NodeId, icon: Option<&str>) -> TreeResult<()> {
        self.node_mut(id)?.icon = icon.map(str::to_string);
        Ok(())
    }

    /// Depth-first, case-insensitive search over names and content
    ///
    /// Lazy and restartable: calling again with the same query yields the
    /// same paths.
    #[must_use]
    pub fn search(&self, query: &str) -> Search<'_> {
        Search::new(self, query)
    }

    /// Every topic path in pre-order (insertion order among siblings)
    #[must_use]
    pub fn all_paths(&self) -> Vec<TopicPath> {
        self.descendants(self.root())
            .filter_map(|id| self.path_of(id).ok())
            .collect()
    }

    /// Ids below `id` in pre-order, `id` itself excluded
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack: Vec<NodeId> = self
            .node(id)
            .map(|n| n.children.iter().rev().copied().collect())
            .unwrap_or_default();
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            if let Ok(node) = self.node(next) {
                stack.extend(node.children.iter().rev().copied());
            }
            Some(next)
        })
    }
}

impl Default for ContentTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject blank topic names
///
/// # Errors
/// `InvalidName` if `name` is empty or only whitespace
pub fn validate_name(name: &str) -> TreeResult<()> {
    if name.trim().is_empty() {
        return Err(TreeError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (ContentTree, NodeId, NodeId) {
        let mut tree = ContentTree::new();
        let root = tree.root();
        let billing = tree.add_child(root, "Billing", Some("💳"), &mut ()).unwrap();
        let upi = tree.add_child(billing, "UPI", None, &mut ()).unwrap();
        (tree, billing, upi)
    }

    #[test]
    fn resolve_follows_segments() {
        let (tree, billing, upi) = sample();
        assert_eq!(tree.resolve(&TopicPath::root()).unwrap(), tree.root());
        assert_eq!(tree.resolve(&TopicPath::single("Billing")).unwrap(), billing);
        assert_eq!(tree.resolve(&TopicPath::from(["Billing", "UPI"])).unwrap(), upi);
    }

    #[test]
    fn resolve_missing_segment_fails() {
        let (tree, _, _) = sample();
        let missing = TopicPath::from(["Billing", "Cash"]);
        assert_eq!(tree.resolve(&missing), Err(TreeError::PathNotFound(missing)));
    }

    #[test]
    fn resolve_is_case_sensitive() {
        let (tree, _, _) = sample();
        assert!(tree.resolve(&TopicPath::single("billing")).is_err());
    }

    #[test]
    fn add_child_starts_empty() {
        let (tree, billing, upi) = sample();
        let node = tree.node(upi).unwrap();
        assert_eq!(node.content(), "");
        assert_eq!(node.icon(), None);
        assert_eq!(node.parent(), Some(billing));
        assert_eq!(tree.node(billing).unwrap().icon(), Some("💳"));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn add_duplicate_leaves_tree_unchanged() {
        let (mut tree, billing, _) = sample();
        let before = tree.all_paths();
        let err = tree.add_child(billing, "UPI", None, &mut ()).unwrap_err();
        assert!(matches!(err, TreeError::DuplicateName { .. }));
        assert_eq!(tree.all_paths(), before);
    }

    #[test]
    fn add_blank_name_rejected() {
        let (mut tree, billing, _) = sample();
        assert!(matches!(
            tree.add_child(billing, "  ", None, &mut ()),
            Err(TreeError::InvalidName(_))
        ));
        assert!(matches!(
            tree.add_child(billing, "", None, &mut ()),
            Err(TreeError::InvalidName(_))
        ));
    }

    #[test]
    fn rename_keeps_id_and_subtree() {
        let (mut tree, _, upi) = sample();
        let root = tree.root();
        tree.set_content(upi, "Pay by UPI").unwrap();
        tree.rename_child(root, "Billing", "Payments", &mut ()).unwrap();

        assert!(tree.resolve(&TopicPath::single("Billing")).is_err());
        let moved = tree.resolve(&TopicPath::from(["Payments", "UPI"])).unwrap();
        assert_eq!(moved, upi);
        assert_eq!(tree.node(moved).unwrap().content(), "Pay by UPI");
    }

    #[test]
    fn rename_onto_existing_fails() {
        let (mut tree, _, _) = sample();
        let root = tree.root();
        tree.add_child(root, "Cash", None, &mut ()).unwrap();
        assert!(matches!(
            tree.rename_child(root, "Cash", "Billing", &mut ()),
            Err(TreeError::DuplicateName { .. })
        ));
    }

    #[test]
    fn rename_missing_fails() {
        let (mut tree, _, _) = sample();
        let root = tree.root();
        assert!(matches!(
            tree.rename_child(root, "Nope", "Other", &mut ()),
            Err(TreeError::PathNotFound(_))
        ));
    }

    #[test]
    fn remove_child_drops_subtree() {
        let (mut tree, billing, upi) = sample();
        let root = tree.root();
        let removed = tree.remove_child(root, "Billing", &mut ()).unwrap();

        assert_eq!(
            removed,
            vec![TopicPath::single("Billing"), TopicPath::from(["Billing", "UPI"])]
        );
        assert!(tree.is_empty());
        assert!(matches!(tree.node(billing), Err(TreeError::UnknownNode(_))));
        assert!(matches!(tree.set_content(upi, "x"), Err(TreeError::UnknownNode(_))));
        assert!(tree.resolve(&TopicPath::single("Billing")).is_err());
    }

    #[test]
    fn ids_are_not_reused() {
        let (mut tree, billing, _) = sample();
        let root = tree.root();
        tree.remove_child(root, "Billing", &mut ()).unwrap();
        let again = tree.add_child(root, "Billing", None, &mut ()).unwrap();
        assert_ne!(again, billing);
    }

    #[test]
    fn all_paths_pre_order() {
        let (mut tree, _, _) = sample();
        let root = tree.root();
        tree.add_child(root, "Accounts", None, &mut ()).unwrap();
        let paths: Vec<_> = tree.all_paths().iter().map(ToString::to_string).collect();
        assert_eq!(paths, vec!["Billing", "Billing / UPI", "Accounts"]);
    }
}
