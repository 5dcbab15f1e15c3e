//! Topic paths
//!
//! Provides [`TopicPath`], the typed identity of a node in the content tree.
//! Privilege grants, ordering lists and attachment namespaces are all keyed by
//! it, so equality and prefix checks work on whole segments rather than on a
//! separator-joined string.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Separator used when a path is shown to people (`Billing / UPI`)
pub const SEPARATOR: &str = " / ";

/// Path from the tree root to a topic
///
/// The empty path is the root itself.
///
/// # Examples
/// - `["Billing"]` → `Billing`
/// - `["Billing", "UPI", "Refunds"]` → `Billing / UPI / Refunds`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicPath(Vec<String>);

impl TopicPath {
    /// Create new path from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Create path from a single segment
    #[inline]
    #[must_use]
    pub fn single(segment: impl Into<String>) -> Self {
        Self(vec![segment.into()])
    }

    /// Empty path (root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments (depth below the root)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path is the root
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Alias of [`TopicPath::is_root`]
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parent path (`None` for the root)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Name of the topic this path points at (`None` for the root)
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Top-level topic this path lives under
    #[inline]
    #[must_use]
    pub fn top(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Append a segment, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(segment.into());
        new
    }

    /// Sibling path with the last segment replaced
    ///
    /// Returns `None` for the root, which has no siblings.
    #[must_use]
    pub fn with_name(&self, name: impl Into<String>) -> Option<Self> {
        self.parent().map(|p| p.child(name))
    }

    /// Check if this path is a prefix of another (or equal to it)
    ///
    /// # Examples
    /// - `Topic` is prefix of `Topic / Sub`
    /// - `Topic` is NOT prefix of `Topic2`
    #[inline]
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        if self.0.len() > other.0.len() {
            return false;
        }
        self.0 == other.0[..self.0.len()]
    }

    /// Check if this path is a strict ancestor of another
    #[inline]
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.0.len() < other.0.len() && self.is_prefix_of(other)
    }

    /// Proper ancestors from the immediate parent upward, excluding the root
    ///
    /// `A / B / C` yields `A / B`, then `A`.
    pub fn ancestors(&self) -> impl Iterator<Item = TopicPath> + '_ {
        (1..self.0.len()).rev().map(move |n| Self(self.0[..n].to_vec()))
    }

    /// Move this path from under `from` to under `to`
    ///
    /// Returns `None` if `from` is not a prefix of `self`.
    #[must_use]
    pub fn rebase(&self, from: &Self, to: &Self) -> Option<Self> {
        if !from.is_prefix_of(self) {
            return None;
        }
        let mut segments = to.0.clone();
        segments.extend_from_slice(&self.0[from.0.len()..]);
        Some(Self(segments))
    }

    /// Iterator over segments from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Join segments with custom separator
    #[inline]
    #[must_use]
    pub fn join(&self, separator: &str) -> String {
        self.0.join(separator)
    }
}

impl Display for TopicPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(SEPARATOR))
    }
}

/// Parses the human form (`Billing / UPI`).
///
/// Names that themselves contain the separator cannot be written this way;
/// build those paths from segments instead.
impl FromStr for TopicPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::root());
        }

        let segments: Vec<String> = s
            .split(SEPARATOR)
            .map(|seg| {
                if seg.trim().is_empty() {
                    Err(PathError::EmptySegment(s.to_string()))
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

impl From<Vec<String>> for TopicPath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl From<&[&str]> for TopicPath {
    fn from(segments: &[&str]) -> Self {
        Self(segments.iter().map(|s| (*s).to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for TopicPath {
    fn from(segments: [&str; N]) -> Self {
        Self(segments.iter().map(|s| (*s).to_string()).collect())
    }
}

/// Errors parsing a topic path
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Empty segment in path
    #[error("path '{0}' contains an empty segment")]
    EmptySegment(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_root() {
        let path = TopicPath::root();
        assert!(path.is_root());
        assert_eq!(path.len(), 0);
        assert!(path.parent().is_none());
        assert!(path.name().is_none());
    }

    #[test]
    fn path_parent_and_name() {
        let path = TopicPath::from(["Billing", "UPI", "Refunds"]);
        assert_eq!(path.parent().unwrap(), TopicPath::from(["Billing", "UPI"]));
        assert_eq!(path.name(), Some("Refunds"));
        assert_eq!(path.top(), Some("Billing"));
    }

    #[test]
    fn path_prefix_is_segment_wise() {
        let topic = TopicPath::single("Topic");
        let topic2 = TopicPath::single("Topic2");
        let sub = TopicPath::from(["Topic", "Sub"]);

        assert!(topic.is_prefix_of(&sub));
        assert!(topic.is_prefix_of(&topic));
        assert!(!topic.is_prefix_of(&topic2));
        assert!(topic.is_ancestor_of(&sub));
        assert!(!topic.is_ancestor_of(&topic));
        assert!(TopicPath::root().is_prefix_of(&topic2));
    }

    #[test]
    fn path_ancestors_exclude_root_and_self() {
        let path = TopicPath::from(["a", "b", "c"]);
        let ancestors: Vec<_> = path.ancestors().map(|p| p.to_string()).collect();
        assert_eq!(ancestors, vec!["a / b", "a"]);
        assert_eq!(TopicPath::single("a").ancestors().count(), 0);
    }

    #[test]
    fn path_rebase() {
        let path = TopicPath::from(["a", "b", "c"]);
        let moved = path
            .rebase(&TopicPath::from(["a", "b"]), &TopicPath::from(["a", "x"]))
            .unwrap();
        assert_eq!(moved, TopicPath::from(["a", "x", "c"]));
        assert!(path.rebase(&TopicPath::single("z"), &TopicPath::root()).is_none());
    }

    #[test]
    fn path_with_name() {
        let path = TopicPath::from(["a", "b"]);
        assert_eq!(path.with_name("c").unwrap(), TopicPath::from(["a", "c"]));
        assert!(TopicPath::root().with_name("x").is_none());
    }

    #[test]
    fn path_display_uses_separator() {
        let path = TopicPath::from(["Billing", "UPI"]);
        assert_eq!(path.to_string(), "Billing / UPI");
        assert_eq!(path.join("_"), "Billing_UPI");
    }

    #[test]
    fn path_from_str() {
        let path: TopicPath = "Billing / UPI".parse().unwrap();
        assert_eq!(path.segments(), &["Billing", "UPI"]);

        let root: TopicPath = "".parse().unwrap();
        assert!(root.is_root());

        let slash_in_name: TopicPath = "A/B / C".parse().unwrap();
        assert_eq!(slash_in_name.segments(), &["A/B", "C"]);
    }

    #[test]
    fn path_from_str_empty_segment() {
        let result: Result<TopicPath, _> = "a /  / b".parse();
        assert!(matches!(result, Err(PathError::EmptySegment(_))));
    }

    #[test]
    fn path_serializes_as_segment_list() {
        let path = TopicPath::from(["a / b", "c"]);
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#"["a / b","c"]"#);
        let back: TopicPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }
}
