//! Announcement feed

use serde::{Deserialize, Serialize};

/// Ordered list of rich-text announcements, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnouncementFeed(Vec<String>);

impl AnnouncementFeed {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an announcement
    ///
    /// Blank text is ignored; returns whether anything was posted.
    pub fn post(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text.trim().is_empty() {
            return false;
        }
        self.0.push(text);
        tracing::info!(count = self.0.len(), "announcement posted");
        true
    }

    /// Remove by 0-based position
    pub fn remove(&mut self, index: usize) -> Option<String> {
        if index >= self.0.len() {
            return None;
        }
        let removed = self.0.remove(index);
        tracing::info!(index, "announcement removed");
        Some(removed)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_and_remove() {
        let mut feed = AnnouncementFeed::new();
        assert!(feed.post("<p>Maintenance tonight</p>"));
        assert!(!feed.post("   "));
        assert!(feed.post("Second"));

        assert_eq!(feed.remove(5), None);
        assert_eq!(feed.remove(0).as_deref(), Some("<p>Maintenance tonight</p>"));
        assert_eq!(feed.iter().collect::<Vec<_>>(), vec!["Second"]);
    }

    #[test]
    fn stored_as_plain_list() {
        let feed: AnnouncementFeed = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(serde_json::to_string(&feed).unwrap(), r#"["a","b"]"#);
    }
}
