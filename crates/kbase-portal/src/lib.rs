//! kbase Portal
//!
//! The session layer over the document store. A [`Portal`] authenticates
//! users, projects the topic under a session's cursor into a [`Page`] and
//! routes every mutation through an authorization gate before writing it
//! back to disk.
//!
//! # Example
//!
//! ```rust,no_run
//! use kbase_portal::{Portal, PortalResult};
//! use kbase_store::PortalConfig;
//!
//! fn show_home() -> PortalResult<()> {
//!     let portal = Portal::open(PortalConfig::new().with_data_dir("data"))?;
//!     let mut session = portal.login("admin", "admin123")?;
//!     let page = portal.page(&mut session)?;
//!     for child in &page.children {
//!         println!("{} {}", child.icon, child.name);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod links;
pub mod page;
pub mod portal;
pub mod session;

pub use error::{Feature, PortalError, PortalResult};
pub use links::open_links_in_new_tab;
pub use page::{breadcrumb, AttachmentLink, ChildLink, Header, Menu, Page, HOME_LABEL};
pub use portal::Portal;
pub use session::{Navigator, Session};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for portal callers
    pub use crate::{Page, Portal, PortalError, PortalResult, Session};
    pub use kbase_access::{Action, ActionSet, Role};
    pub use kbase_tree::TopicPath;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
