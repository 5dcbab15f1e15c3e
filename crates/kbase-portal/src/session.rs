//! Login sessions and the navigation cursor

use kbase_access::Role;
use kbase_tree::TopicPath;

/// Where a session is looking in the tree
///
/// The cursor is only a path; it is checked against the tree whenever a page
/// is rendered, and a path that no longer resolves sends the session home.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigator {
    current: TopicPath,
}

impl Navigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> &TopicPath {
        &self.current
    }

    #[must_use]
    pub fn is_home(&self) -> bool {
        self.current.is_root()
    }

    /// Step into a child of the current topic
    pub fn open(&mut self, child: impl Into<String>) {
        self.current = self.current.child(child);
    }

    /// Jump straight to a path
    pub fn go(&mut self, path: TopicPath) {
        self.current = path;
    }

    /// Step up one level; a no-op at home
    pub fn back(&mut self) {
        if let Some(parent) = self.current.parent() {
            self.current = parent;
        }
    }

    pub fn home(&mut self) {
        self.current = TopicPath::root();
    }
}

/// An authenticated user and their cursor
///
/// The role is a snapshot taken at login, for display. Authorization always
/// reads the current account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    username: String,
    role: Role,
    pub nav: Navigator,
}

impl Session {
    pub(crate) fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
            nav: Navigator::new(),
        }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_moves_cursor() {
        let mut nav = Navigator::new();
        assert!(nav.is_home());
        nav.open("Billing");
        nav.open("UPI");
        assert_eq!(nav.current().to_string(), "Billing / UPI");
        nav.back();
        assert_eq!(nav.current(), &TopicPath::single("Billing"));
        nav.home();
        nav.back();
        assert!(nav.is_home());
    }
}
