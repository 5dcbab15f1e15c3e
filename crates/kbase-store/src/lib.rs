//! kbase Document Store
//!
//! Persistence for the knowledge base. Every logical document is a JSON file
//! loaded whole and written whole:
//!
//! - the topic tree (nested `name → { icon, content, subtopics }`)
//! - the settings bundle: [`DisplaySettings`], ordering, visibility, privileges
//! - the user directory
//! - the announcement feed
//!
//! Attachments live in per-topic namespace directories managed by
//! [`AttachmentStore`]. Writes are atomic per file and guarded by
//! [`VersionStamp`]s (see [`WritePolicy`]).

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod announcements;
pub mod attachments;
pub mod config;
pub mod document;
pub mod error;
pub mod legacy;
pub mod settings;
pub mod stamp;
pub mod store;

pub use announcements::AnnouncementFeed;
pub use attachments::{is_image, validate_file_name, Attachment, AttachmentStore, ALLOWED_EXTENSIONS};
pub use config::{PortalConfig, WritePolicy, DEFAULT_ADMIN_PASSWORD};
pub use document::Document;
pub use error::{StoreError, StoreResult};
pub use legacy::{import_legacy, ImportReport};
pub use settings::{
    Appearance, DisplaySettings, FeatureToggles, FontFamily, HeaderContent, HeaderSettings, SettingsDocument,
};
pub use stamp::VersionStamp;
pub use store::DataStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
