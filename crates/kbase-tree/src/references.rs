//! Path-keyed side tables
//!
//! Ordering lists, visibility flags and privilege grants are keyed by
//! [`TopicPath`]. The tree notifies them through [`PathReferences`] whenever a
//! path appears, moves or disappears, so no table is left pointing at a name
//! that no longer exists.

use crate::path::TopicPath;

/// Receiver of structural changes to the tree
pub trait PathReferences {
    /// A node was created at `path`
    fn path_added(&mut self, _path: &TopicPath) {}

    /// The node at `from` (and its whole subtree) now lives at `to`
    fn path_renamed(&mut self, from: &TopicPath, to: &TopicPath);

    /// The node at `path` and its whole subtree were deleted
    fn path_removed(&mut self, path: &TopicPath);
}

/// No side tables
impl PathReferences for () {
    fn path_renamed(&mut self, _from: &TopicPath, _to: &TopicPath) {}

    fn path_removed(&mut self, _path: &TopicPath) {}
}

impl<A, B> PathReferences for (A, B)
where
    A: PathReferences,
    B: PathReferences,
{
    fn path_added(&mut self, path: &TopicPath) {
        self.0.path_added(path);
        self.1.path_added(path);
    }

    fn path_renamed(&mut self, from: &TopicPath, to: &TopicPath) {
        self.0.path_renamed(from, to);
        self.1.path_renamed(from, to);
    }

    fn path_removed(&mut self, path: &TopicPath) {
        self.0.path_removed(path);
        self.1.path_removed(path);
    }
}

impl<T: PathReferences + ?Sized> PathReferences for &mut T {
    fn path_added(&mut self, path: &TopicPath) {
        (**self).path_added(path);
    }

    fn path_renamed(&mut self, from: &TopicPath, to: &TopicPath) {
        (**self).path_renamed(from, to);
    }

    fn path_removed(&mut self, path: &TopicPath) {
        (**self).path_removed(path);
    }
}
