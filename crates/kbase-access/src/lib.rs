//! kbase Access Resolver
//!
//! Decides whether a user may view or edit a topic. Grants are recorded per
//! user and path and inherited by every descendant; accounts with the
//! `Admin` role bypass the table entirely.
//!
//! # Core Concepts
//!
//! - [`PrivilegeTable`]: username → path → [`ActionSet`], replace-only grants
//! - [`AccessResolver`]: `authorize(user, path, action)` over accounts and grants
//! - [`UserDirectory`]: accounts with argon2id password hashes and a [`Role`]
//!
//! # Example
//!
//! ```rust
//! use kbase_access::{Action, ActionSet, PrivilegeTable, Role, UserAccount};
//! use kbase_tree::TopicPath;
//!
//! let mut table = PrivilegeTable::new();
//! table.grant("ravi", TopicPath::single("Topic"), ActionSet::from([Action::View]));
//!
//! let ravi = UserAccount::new("ravi", "", Role::User);
//! let sub = TopicPath::from(["Topic", "Sub"]);
//! assert!(table.authorize(&ravi, &sub, Action::View));
//! assert!(!table.authorize(&ravi, &sub, Action::Edit));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod action;
pub mod error;
pub mod password;
pub mod privilege;
pub mod resolver;
pub mod role;
pub mod user;

pub use action::{Action, ActionSet};
pub use error::{AccessError, AccessResult};
pub use password::{hash_password, is_password_hash, verify_password};
pub use privilege::{GrantRecord, PrivilegeTable};
pub use resolver::AccessResolver;
pub use role::Role;
pub use user::{validate_username, UserAccount, UserDirectory, BUILTIN_ADMIN};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for access checks
    pub use crate::{AccessError, AccessResolver, Action, ActionSet, PrivilegeTable, Role, UserDirectory};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
