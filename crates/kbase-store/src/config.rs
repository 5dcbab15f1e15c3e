//! Portal configuration
//!
//! Loaded from TOML. Every key is optional; missing keys take the defaults
//! below, so an empty file is a valid configuration.

use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Password given to the built-in admin when no user document exists
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// What to do when a document changed on disk since it was loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Refuse the write with `StaleWrite`
    #[default]
    Optimistic,
    /// Overwrite whatever is there
    LastWriteWins,
}

/// Portal configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Directory holding every document and the upload tree
    pub data_dir: PathBuf,
    /// Topic tree document
    pub tree_file: String,
    /// Settings bundle (display, ordering, visibility, privileges)
    pub settings_file: String,
    /// User accounts
    pub users_file: String,
    /// Announcement feed
    pub announcements_file: String,
    /// Attachment root, relative to `data_dir`
    pub upload_dir: String,
    /// Concurrent-write handling
    pub write_policy: WritePolicy,
    /// Require view grants to browse topics
    pub enforce_view_grants: bool,
    /// Password for the seeded admin account
    pub initial_admin_password: String,
}

impl PortalConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With data directory
    #[inline]
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// With write policy
    #[inline]
    #[must_use]
    pub fn with_write_policy(mut self, policy: WritePolicy) -> Self {
        self.write_policy = policy;
        self
    }

    /// With view grant enforcement
    #[inline]
    #[must_use]
    pub fn with_view_grants(mut self, enforce: bool) -> Self {
        self.enforce_view_grants = enforce;
        self
    }

    /// With initial admin password
    #[inline]
    #[must_use]
    pub fn with_initial_admin_password(mut self, password: impl Into<String>) -> Self {
        self.initial_admin_password = password.into();
        self
    }

    /// Load config from a TOML file
    ///
    /// # Errors
    /// - `Io` if the file cannot be read
    /// - `Config` if it is not valid TOML for this shape
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| StoreError::io_error(path, e))?;
        toml::from_str(&content).map_err(|e| StoreError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Save config as TOML
    ///
    /// # Errors
    /// `Io` or `Config` on failure
    pub fn save(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| StoreError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| StoreError::io_error(path, e))
    }

    #[must_use]
    pub fn tree_path(&self) -> PathBuf {
        self.data_dir.join(&self.tree_file)
    }

    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(&self.settings_file)
    }

    #[must_use]
    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join(&self.users_file)
    }

    #[must_use]
    pub fn announcements_path(&self) -> PathBuf {
        self.data_dir.join(&self.announcements_file)
    }

    #[must_use]
    pub fn upload_path(&self) -> PathBuf {
        self.data_dir.join(&self.upload_dir)
    }

    /// Whether the seeded admin would get the well-known default password
    #[must_use]
    pub fn uses_default_admin_password(&self) -> bool {
        self.initial_admin_password == DEFAULT_ADMIN_PASSWORD
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            tree_file: "data.json".to_string(),
            settings_file: "settings.json".to_string(),
            users_file: "users.json".to_string(),
            announcements_file: "announcements.json".to_string(),
            upload_dir: "uploads".to_string(),
            write_policy: WritePolicy::Optimistic,
            enforce_view_grants: false,
            initial_admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let config: PortalConfig = toml::from_str("").unwrap();
        assert_eq!(config, PortalConfig::default());
        assert!(config.uses_default_admin_password());
    }

    #[test]
    fn partial_toml_overrides() {
        let config: PortalConfig = toml::from_str(
            r#"
            data_dir = "/srv/kb"
            write_policy = "last_write_wins"
            enforce_view_grants = true
            "#,
        )
        .unwrap();
        assert_eq!(config.write_policy, WritePolicy::LastWriteWins);
        assert!(config.enforce_view_grants);
        assert_eq!(config.tree_path(), PathBuf::from("/srv/kb/data.json"));
        assert_eq!(config.upload_path(), PathBuf::from("/srv/kb/uploads"));
    }

    #[test]
    fn builders_chain() {
        let config = PortalConfig::new()
            .with_data_dir("/tmp/kb")
            .with_view_grants(true)
            .with_initial_admin_password("s3cret");
        assert!(config.enforce_view_grants);
        assert!(!config.uses_default_admin_password());
        assert_eq!(config.users_path(), PathBuf::from("/tmp/kb/users.json"));
    }
}
