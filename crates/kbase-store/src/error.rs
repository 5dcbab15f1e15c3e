//! Error types for document and attachment storage

use kbase_access::AccessError;
use kbase_tree::{TopicPath, TreeError};
use std::path::PathBuf;

/// Errors from loading, saving and importing documents
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem failure
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document is not valid JSON for its type
    #[error("malformed document {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file is not valid TOML
    #[error("malformed config {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// The file changed on disk since it was loaded
    #[error("{path} changed on disk since it was loaded (expected {expected}, found {found})")]
    StaleWrite {
        path: PathBuf,
        expected: String,
        found: String,
    },

    /// Attachment name is empty, a dot entry or contains a separator
    #[error("invalid file name: {0:?}")]
    InvalidFileName(String),

    /// Attachment extension not on the upload whitelist
    #[error("unsupported file type: {0:?}")]
    UnsupportedFileType(String),

    /// No such attachment
    #[error("no attachment '{name}' on '{path}'")]
    AttachmentNotFound { path: TopicPath, name: String },

    /// Tree error while decoding or importing
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Account error while importing
    #[error(transparent)]
    Access(#[from] AccessError),
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create JSON error for path
    pub fn json_error(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
