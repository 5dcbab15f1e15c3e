//! Testing utilities for the kbase workspace
//!
//! Shared fixtures: a small sample tree and a portal living in a temporary
//! data directory with a few accounts already set up.

#![allow(missing_docs)]

use kbase_access::{Action, ActionSet, Role};
use kbase_portal::{Portal, Session};
use kbase_store::{PortalConfig, DEFAULT_ADMIN_PASSWORD};
use kbase_tree::{ContentTree, TopicPath};
use serde_json::{json, Value};
use tempfile::TempDir;

/// Editor account created by [`TestPortal::new`]
pub const EDITOR: &str = "meena";
/// Plain account with grants under `Billing`
pub const USER: &str = "ravi";
/// Plain account with no grants
pub const OUTSIDER: &str = "guest";

/// Password every fixture account uses, admin included
pub fn password_for(user: &str) -> String {
    if user == "admin" {
        DEFAULT_ADMIN_PASSWORD.to_string()
    } else {
        format!("pw-{user}")
    }
}

pub fn sample_tree_json() -> Value {
    json!({
        "Billing": {
            "icon": "💳",
            "content": "<p>Billing help. See <a href=\"https://example.org/pay\">pay</a>.</p>",
            "subtopics": {
                "UPI": { "content": "UPI refunds take two days", "subtopics": {} },
                "Cards": { "content": "", "subtopics": {
                    "Chargebacks": { "content": "File within 30 days", "subtopics": {} }
                } }
            }
        },
        "Accounts": { "content": "Opening an account", "subtopics": {} },
        "Network": { "icon": "📡", "content": "", "subtopics": {} }
    })
}

pub fn sample_tree() -> ContentTree {
    ContentTree::from_json(&sample_tree_json()).unwrap()
}

/// A portal over a temporary data directory
///
/// The directory lives as long as the fixture.
pub struct TestPortal {
    pub dir: TempDir,
    pub portal: Portal,
}

impl TestPortal {
    /// Sample tree, default settings and three accounts besides admin
    ///
    /// `ravi` may view `Billing` and edit `Billing / UPI`.
    pub fn new() -> Self {
        Self::with_config(|config| config)
    }

    /// As [`TestPortal::new`], adjusting the config first
    pub fn with_config(adjust: impl FnOnce(PortalConfig) -> PortalConfig) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = adjust(PortalConfig::new().with_data_dir(dir.path()));
        std::fs::write(config.tree_path(), serde_json::to_vec(&sample_tree_json()).unwrap()).unwrap();

        let mut portal = Portal::init(config).unwrap();
        let admin = portal.login("admin", DEFAULT_ADMIN_PASSWORD).unwrap();
        for (user, role) in [(EDITOR, Role::Editor), (USER, Role::User), (OUTSIDER, Role::User)] {
            portal.add_user(&admin, user, &password_for(user), role).unwrap();
        }
        portal
            .grant(&admin, USER, &TopicPath::single("Billing"), [Action::View].into())
            .unwrap();
        portal
            .grant(&admin, USER, &TopicPath::from(["Billing", "UPI"]), ActionSet::all())
            .unwrap();

        Self { dir, portal }
    }

    pub fn login(&self, user: &str) -> Session {
        self.portal.login(user, &password_for(user)).unwrap()
    }

    pub fn admin(&self) -> Session {
        self.login("admin")
    }

    /// A second portal over the same directory
    pub fn reopen(&self) -> Portal {
        Portal::open(self.portal.config().clone()).unwrap()
    }
}

impl Default for TestPortal {
    fn default() -> Self {
        Self::new()
    }
}
