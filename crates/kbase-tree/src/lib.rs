//! kbase Topic Tree
//!
//! The hierarchical content model of the knowledge base: topics, subtopics
//! and their rich-text content, with independent display ordering and
//! root-level visibility.
//!
//! # Core Concepts
//!
//! - [`ContentTree`]: arena of [`TopicNode`]s addressed by stable [`NodeId`]s
//! - [`TopicPath`]: typed path from the root, used as the key of every side table
//! - [`OrderingConfig`]: per-parent display order, tolerant of stale names
//! - [`VisibilityConfig`]: hides top-level topics from navigation
//! - [`PathReferences`]: how side tables follow adds, renames and removals
//!
//! # Example
//!
//! ```rust
//! use kbase_tree::{ContentTree, OrderingConfig, TopicPath, VisibilityConfig};
//!
//! let mut tree = ContentTree::new();
//! let mut ordering = OrderingConfig::new();
//! let root = tree.root();
//!
//! let billing = tree.add_child(root, "Billing", Some("💳"), &mut ordering).unwrap();
//! tree.set_content(billing, "Pay by UPI").unwrap();
//!
//! let hits: Vec<TopicPath> = tree.search("upi").collect();
//! assert_eq!(hits, vec![TopicPath::single("Billing")]);
//!
//! let listed = tree.list_children(root, &ordering, &VisibilityConfig::new()).unwrap();
//! assert_eq!(listed[0].name, "Billing");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod nested;
mod node;
mod ordering;
mod path;
mod references;
mod search;
mod tree;
mod visibility;

pub use error::{TreeError, TreeResult};
pub use node::{NodeId, TopicNode};
pub use ordering::OrderingConfig;
pub use path::{PathError, TopicPath, SEPARATOR};
pub use references::PathReferences;
pub use search::Search;
pub use tree::{validate_name, ChildEntry, ContentTree};
pub use visibility::VisibilityConfig;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the topic tree
    pub use crate::{
        ChildEntry, ContentTree, NodeId, OrderingConfig, PathReferences, TopicNode, TopicPath,
        TreeError, VisibilityConfig,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
