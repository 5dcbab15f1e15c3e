//! The set of documents behind one portal

use crate::announcements::AnnouncementFeed;
use crate::attachments::AttachmentStore;
use crate::config::PortalConfig;
use crate::document::Document;
use crate::error::{StoreError, StoreResult};
use crate::settings::SettingsDocument;
use kbase_access::UserDirectory;
use kbase_tree::ContentTree;

/// Every persistent document plus the attachment store
#[derive(Debug)]
pub struct DataStore {
    pub config: PortalConfig,
    pub tree: Document<ContentTree>,
    pub settings: Document<SettingsDocument>,
    pub users: Document<UserDirectory>,
    pub announcements: Document<AnnouncementFeed>,
    pub attachments: AttachmentStore,
}

impl DataStore {
    /// Load every document
    ///
    /// Settings are reconciled with the tree and the built-in admin is
    /// seeded when missing; either change is written back immediately.
    ///
    /// # Errors
    /// Any load or save failure
    pub fn open(config: PortalConfig) -> StoreResult<Self> {
        let policy = config.write_policy;
        let tree = Document::<ContentTree>::load(config.tree_path(), policy)?;
        let mut settings = Document::<SettingsDocument>::load(config.settings_path(), policy)?;
        let mut users = Document::<UserDirectory>::load(config.users_path(), policy)?;
        let announcements = Document::load(config.announcements_path(), policy)?;
        let attachments = AttachmentStore::new(config.upload_path());

        if settings.reconcile(&tree) && settings.is_persisted() {
            settings.save()?;
        }
        if users.ensure_admin(&config.initial_admin_password)? {
            if config.uses_default_admin_password() {
                tracing::warn!("built-in admin seeded with the default password; change it");
            } else {
                tracing::info!("built-in admin seeded");
            }
            users.save()?;
        }

        tracing::info!(
            data_dir = %config.data_dir.display(),
            topics = tree.len(),
            users = users.len(),
            "data store opened"
        );
        Ok(Self {
            config,
            tree,
            settings,
            users,
            announcements,
            attachments,
        })
    }

    /// Create the data directory and write every missing document
    ///
    /// # Errors
    /// Any filesystem failure
    pub fn init(config: PortalConfig) -> StoreResult<Self> {
        let upload = config.upload_path();
        std::fs::create_dir_all(&upload).map_err(|e| StoreError::io_error(&upload, e))?;

        let mut store = Self::open(config)?;
        if !store.tree.is_persisted() {
            store.tree.save()?;
        }
        if !store.settings.is_persisted() {
            store.settings.save()?;
        }
        if !store.users.is_persisted() {
            store.users.save()?;
        }
        if !store.announcements.is_persisted() {
            store.announcements.save()?;
        }
        Ok(store)
    }

    /// Fail with `StaleWrite` if the tree or settings file changed on disk
    ///
    /// # Errors
    /// As [`Document::ensure_fresh`]
    pub fn ensure_tree_and_settings_fresh(&self) -> StoreResult<()> {
        self.tree.ensure_fresh()?;
        self.settings.ensure_fresh()
    }

    /// Persist the tree and the settings bundle together
    ///
    /// Both stamps are checked before either file is written, so a conflict
    /// on one leaves both untouched. The two writes themselves are not
    /// atomic as a pair.
    ///
    /// # Errors
    /// As [`Document::save`]
    pub fn save_tree_and_settings(&mut self) -> StoreResult<()> {
        self.ensure_tree_and_settings_fresh()?;
        self.tree.save()?;
        self.settings.save()
    }
}
