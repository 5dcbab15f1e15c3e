//! Error types for the content tree

use crate::node::NodeId;
use crate::path::TopicPath;

/// Errors from tree navigation and mutation
///
/// All of these are logical failures; none are transient.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// A path segment does not exist
    #[error("path not found: '{0}'")]
    PathNotFound(TopicPath),

    /// A sibling with the same name already exists
    #[error("'{name}' already exists under '{parent}'")]
    DuplicateName { parent: TopicPath, name: String },

    /// Blank topic name
    #[error("invalid topic name: {0:?}")]
    InvalidName(String),

    /// A node in a nested document is not a mapping
    #[error("not a directory: '{0}'")]
    NotADirectory(TopicPath),

    /// Id refers to a removed node or was never issued
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),
}

impl TreeError {
    /// Create duplicate-name error
    pub fn duplicate(parent: TopicPath, name: impl Into<String>) -> Self {
        Self::DuplicateName {
            parent,
            name: name.into(),
        }
    }
}

/// Result type alias for tree operations
pub type TreeResult<T> = Result<T, TreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_error_display() {
        let err = TreeError::PathNotFound(TopicPath::from(["Billing", "UPI"]));
        assert_eq!(err.to_string(), "path not found: 'Billing / UPI'");

        let err = TreeError::duplicate(TopicPath::single("Billing"), "UPI");
        assert_eq!(err.to_string(), "'UPI' already exists under 'Billing'");
    }
}
