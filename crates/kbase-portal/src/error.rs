//! Error types for the portal

use kbase_access::{AccessError, Role};
use kbase_store::StoreError;
use kbase_tree::{PathError, TreeError};

/// Features that can be switched off in the settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    EditorTools,
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::EditorTools => "editor tools",
        })
    }
}

/// Errors surfaced to portal callers
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    /// Wrong username or password
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The operation needs a role the session does not have
    #[error("user '{user}' needs the {required} role")]
    RoleRequired { user: String, required: Role },

    /// The feature is switched off in the settings
    #[error("{0} are disabled")]
    FeatureDisabled(Feature),

    #[error("no announcement at position {0}")]
    NoSuchAnnouncement(usize),

    /// Unusable configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed path string
    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for portal operations
pub type PortalResult<T> = Result<T, PortalError>;
