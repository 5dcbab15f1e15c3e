//! Full-text topic search

use crate::node::NodeId;
use crate::path::TopicPath;
use crate::tree::ContentTree;

/// Lazy depth-first search over topic names and content
///
/// Visits topics in pre-order, siblings in insertion order, and yields each
/// matching topic's path once. Holds no state beyond its own traversal stack.
#[derive(Debug, Clone)]
pub struct Search<'a> {
    tree: &'a ContentTree,
    needle: String,
    stack: Vec<NodeId>,
}

impl<'a> Search<'a> {
    pub(crate) fn new(tree: &'a ContentTree, query: &str) -> Self {
        let needle = query.to_lowercase();
        let stack = if needle.is_empty() {
            Vec::new()
        } else {
            tree.node(tree.root())
                .map(|root| root.children().iter().rev().copied().collect())
                .unwrap_or_default()
        };
        Self { tree, needle, stack }
    }
}

impl Iterator for Search<'_> {
    type Item = TopicPath;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            let Ok(node) = self.tree.node(id) else {
                continue;
            };
            self.stack.extend(node.children().iter().rev().copied());
            if node.matches(&self.needle) {
                if let Ok(path) = self.tree.path_of(id) {
                    return Some(path);
                }
            }
        }
        None
    }
}
