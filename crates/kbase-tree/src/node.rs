//! Topic nodes stored in the tree arena

use std::fmt::{self, Display, Formatter};

/// Stable identifier of a node in a [`ContentTree`](crate::ContentTree)
///
/// Ids are never reused within one tree, so an id held across a removal
/// reports `UnknownNode` instead of aliasing a different topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw arena index
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single topic: name, icon, rich-text content and ordered children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicNode {
    pub(crate) name: String,
    pub(crate) icon: Option<String>,
    pub(crate) content: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl TopicNode {
    pub(crate) fn new(name: impl Into<String>, icon: Option<String>, parent: Option<NodeId>) -> Self {
        Self {
            name: name.into(),
            icon,
            content: String::new(),
            parent,
            children: Vec::new(),
        }
    }

    /// Name among its siblings (empty for the root)
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Icon, if one was set
    #[inline]
    #[must_use]
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// Icon, or `default` when none was set
    #[inline]
    #[must_use]
    pub fn icon_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.icon.as_deref().unwrap_or(default)
    }

    /// Rich-text content (HTML or plain)
    #[inline]
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Parent id (`None` for the root)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Check whether name or content contains `needle`
    ///
    /// `needle` must already be lowercase.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.content.to_lowercase().contains(needle)
    }
}
