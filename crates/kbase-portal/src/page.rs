//! Page projection
//!
//! A [`Page`] is everything a front end needs to draw the topic under a
//! session's cursor. Building one never mutates anything.

use kbase_store::{Attachment, HeaderContent};
use kbase_tree::TopicPath;
use serde::Serialize;

/// Breadcrumb shown at the root
pub const HOME_LABEL: &str = "🏠 Home";

/// Breadcrumb for a path
#[must_use]
pub fn breadcrumb(path: &TopicPath) -> String {
    if path.is_root() {
        HOME_LABEL.to_string()
    } else {
        path.to_string()
    }
}

/// Header area, resolved from the display settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Header {
    Hidden,
    Logo(String),
    Title(String),
}

impl From<HeaderContent<'_>> for Header {
    fn from(content: HeaderContent<'_>) -> Self {
        match content {
            HeaderContent::Hidden => Self::Hidden,
            HeaderContent::Logo(logo) => Self::Logo(logo.to_string()),
            HeaderContent::Title(title) => Self::Title(title.to_string()),
        }
    }
}

/// A navigable child topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildLink {
    pub name: String,
    /// Own icon, or the configured default
    pub icon: String,
    pub path: TopicPath,
}

/// A downloadable file on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentLink {
    pub name: String,
    pub size: u64,
    /// Rendered as a preview rather than a link
    pub is_image: bool,
}

impl From<Attachment> for AttachmentLink {
    fn from(a: Attachment) -> Self {
        Self {
            name: a.name,
            size: a.size,
            is_image: a.is_image,
        }
    }
}

/// Sidebar entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Menu {
    pub manage_users: bool,
    pub settings: bool,
}

/// Rendered view of one topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub path: TopicPath,
    pub breadcrumb: String,
    pub header: Header,
    pub children: Vec<ChildLink>,
    /// Rich text with links opening in a new tab
    pub content: String,
    /// Always empty at home
    pub attachments: Vec<AttachmentLink>,
    /// Editor tools are shown
    pub can_edit: bool,
    /// Present at home while the feed is enabled
    pub announcements: Option<Vec<String>>,
    pub can_manage_announcements: bool,
    pub menu: Menu,
}

impl Page {
    #[must_use]
    pub fn is_home(&self) -> bool {
        self.path.is_root()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breadcrumb_labels() {
        assert_eq!(breadcrumb(&TopicPath::root()), "🏠 Home");
        assert_eq!(breadcrumb(&TopicPath::from(["A", "B"])), "A / B");
    }

    #[test]
    fn header_serializes_tagged() {
        let json = serde_json::to_value(Header::Title("KB".into())).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "title", "value": "KB" }));
    }
}
