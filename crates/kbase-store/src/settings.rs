//! The settings document
//!
//! One JSON document bundles the display settings with the three path-keyed
//! tables: ordering, root visibility and privileges. Missing keys take their
//! defaults, so older files keep loading as new settings appear.

use kbase_access::PrivilegeTable;
use kbase_tree::{ContentTree, OrderingConfig, PathReferences, TopicPath, VisibilityConfig};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Smallest and largest allowed font size in px
pub const FONT_SIZE_RANGE: (u8, u8) = (12, 24);

/// Body font family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    Sans,
    Serif,
    Monospace,
}

impl Display for FontFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sans => "Sans",
            Self::Serif => "Serif",
            Self::Monospace => "Monospace",
        })
    }
}

impl FromStr for FontFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sans" => Ok(Self::Sans),
            "serif" => Ok(Self::Serif),
            "monospace" => Ok(Self::Monospace),
            other => Err(format!("unknown font family: {other}")),
        }
    }
}

/// Colours, font and icon defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Appearance {
    pub background_color: String,
    pub font_color: String,
    pub font_family: FontFamily,
    /// Clamped to [`FONT_SIZE_RANGE`]
    pub font_size: u8,
    /// Icon for topics that have none
    pub default_icon: String,
    pub announcement_bg: String,
    pub theme_mode: String,
}

impl Appearance {
    /// Set the font size, clamped to the allowed range
    pub fn set_font_size(&mut self, size: u8) {
        self.font_size = size.clamp(FONT_SIZE_RANGE.0, FONT_SIZE_RANGE.1);
    }
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            background_color: "#0f172a".to_string(),
            font_color: "#ffffff".to_string(),
            font_family: FontFamily::Sans,
            font_size: 16,
            default_icon: "📘".to_string(),
            announcement_bg: "#1f6feb".to_string(),
            theme_mode: "dark".to_string(),
        }
    }
}

/// Header area controls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderSettings {
    pub header_visible: bool,
    pub header_title: String,
    /// File name of an uploaded logo
    pub header_logo: Option<String>,
    pub show_title: bool,
    pub show_logo: bool,
    /// Overrides every other header flag
    pub hide_header: bool,
}

/// What the header area shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderContent<'a> {
    Hidden,
    Logo(&'a str),
    Title(&'a str),
}

impl HeaderSettings {
    /// Resolve the header flags
    ///
    /// `logo_available` reports whether the configured logo file can
    /// actually be shown; an unavailable logo falls back to the title.
    pub fn effective<'a>(&'a self, logo_available: impl FnOnce(&str) -> bool) -> HeaderContent<'a> {
        if self.hide_header || !self.header_visible {
            return HeaderContent::Hidden;
        }
        if self.show_logo {
            if let Some(logo) = self.header_logo.as_deref().filter(|l| !l.is_empty()) {
                if logo_available(logo) {
                    return HeaderContent::Logo(logo);
                }
            }
        }
        if self.show_title {
            HeaderContent::Title(&self.header_title)
        } else {
            HeaderContent::Hidden
        }
    }
}

impl Default for HeaderSettings {
    fn default() -> Self {
        Self {
            header_visible: true,
            header_title: "📘 KNOWLEDGE PORTAL".to_string(),
            header_logo: None,
            show_title: true,
            show_logo: true,
            hide_header: false,
        }
    }
}

/// Switchable portal features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureToggles {
    pub announcements: bool,
    pub editor_tools: bool,
    pub user_management: bool,
    pub settings_menu: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            announcements: true,
            editor_tools: true,
            user_management: true,
            settings_menu: true,
        }
    }
}

/// Display settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    #[serde(flatten)]
    pub appearance: Appearance,
    #[serde(flatten)]
    pub header: HeaderSettings,
    pub feature_toggles: FeatureToggles,
}

/// Settings bundle persisted as one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsDocument {
    #[serde(flatten)]
    pub display: DisplaySettings,
    pub visible_sections: VisibilityConfig,
    pub ordering: OrderingConfig,
    pub user_privileges: PrivilegeTable,
}

impl SettingsDocument {
    /// Bring the tables in line with the tree
    ///
    /// Adds missing visibility entries as visible, appends missing children
    /// to ordering lists and clamps the font size. Entries for topics that no
    /// longer exist are dropped, grants included, so a topic created later
    /// under an old name starts clean. Returns `true` if anything changed.
    pub fn reconcile(&mut self, tree: &ContentTree) -> bool {
        let before = self.clone();
        self.visible_sections.reconcile(tree);
        self.ordering.reconcile(tree);
        let dropped = self.user_privileges.retain_paths(|path| tree.resolve(path).is_ok());
        if dropped > 0 {
            tracing::warn!(dropped, "grants on missing topics dropped");
        }
        let size = self.display.appearance.font_size;
        self.display.appearance.set_font_size(size);
        let changed = *self != before;
        if changed {
            tracing::info!("settings reconciled with tree");
        }
        changed
    }

    /// Restore display defaults, keeping ordering, visibility and privileges
    pub fn reset_display(&mut self) {
        self.display = DisplaySettings::default();
        tracing::info!("display settings reset");
    }
}

impl PathReferences for SettingsDocument {
    fn path_added(&mut self, path: &TopicPath) {
        self.ordering.path_added(path);
        self.visible_sections.path_added(path);
        self.user_privileges.path_added(path);
    }

    fn path_renamed(&mut self, from: &TopicPath, to: &TopicPath) {
        self.ordering.path_renamed(from, to);
        self.visible_sections.path_renamed(from, to);
        self.user_privileges.path_renamed(from, to);
    }

    fn path_removed(&mut self, path: &TopicPath) {
        self.ordering.path_removed(path);
        self.visible_sections.path_removed(path);
        self.user_privileges.path_removed(path);
    }
}
