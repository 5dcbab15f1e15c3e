//! The portal facade
//!
//! [`Portal`] owns the loaded documents and is the only way a session can
//! change them. Every mutating entry point passes through one of two gates
//! before touching anything: [`Portal::require`] for topic-scoped actions
//! and a role check for account, announcement and settings management.
//! Changes are written back before the call returns.

use crate::error::{Feature, PortalError, PortalResult};
use crate::links::open_links_in_new_tab;
use crate::page::{breadcrumb, AttachmentLink, ChildLink, Menu, Page};
use crate::session::Session;
use kbase_access::{AccessError, AccessResolver, Action, ActionSet, Role, UserAccount};
use kbase_store::{DataStore, DisplaySettings, PortalConfig};
use kbase_tree::TopicPath;

/// Loaded portal state
#[derive(Debug)]
pub struct Portal {
    store: DataStore,
}

impl Portal {
    /// Load the documents named by `config`
    ///
    /// # Errors
    /// - `Config` for an empty initial admin password
    /// - `Store` if a document cannot be loaded
    pub fn open(config: PortalConfig) -> PortalResult<Self> {
        validate_config(&config)?;
        Ok(Self::from_store(DataStore::open(config)?))
    }

    /// Create the data directory and its documents, then open it
    ///
    /// # Errors
    /// As [`Portal::open`]
    pub fn init(config: PortalConfig) -> PortalResult<Self> {
        validate_config(&config)?;
        Ok(Self::from_store(DataStore::init(config)?))
    }

    #[must_use]
    pub fn from_store(store: DataStore) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &DataStore {
        &self.store
    }

    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.store.config
    }

    /// Drop in-memory state and read every document again
    ///
    /// The way out after a `StaleWrite`.
    ///
    /// # Errors
    /// As [`Portal::open`]
    pub fn reload(&mut self) -> PortalResult<()> {
        self.store = DataStore::open(self.store.config.clone())?;
        Ok(())
    }

    /// Check credentials and start a session at home
    ///
    /// # Errors
    /// `InvalidCredentials`
    pub fn login(&self, username: &str, password: &str) -> PortalResult<Session> {
        let account = self
            .store
            .users
            .authenticate(username, password)
            .ok_or(PortalError::InvalidCredentials)?;
        tracing::info!(user = username, role = %account.role, "login");
        Ok(Session::new(&account.username, account.role))
    }

    // ------------------------------------------------------------------
    // Authorization
    // ------------------------------------------------------------------

    /// Resolver over the current accounts and grants
    #[must_use]
    pub fn resolver(&self) -> AccessResolver<'_> {
        AccessResolver::new(&self.store.users, &self.store.settings.user_privileges)
    }

    fn account(&self, session: &Session) -> PortalResult<&UserAccount> {
        self.store
            .users
            .get(session.username())
            .ok_or_else(|| AccessError::UnknownUser(session.username().to_string()).into())
    }

    /// Whether the session may perform `action` on `path`
    ///
    /// Unless `enforce_view_grants` is set, any existing account may view
    /// every topic.
    #[must_use]
    pub fn authorize(&self, session: &Session, path: &TopicPath, action: Action) -> bool {
        if action == Action::View && !self.config().enforce_view_grants {
            return self.store.users.contains(session.username());
        }
        self.resolver().authorize(session.username(), path, action)
    }

    /// The gate in front of every topic-scoped operation
    ///
    /// # Errors
    /// `Access(Unauthorized)` when [`Portal::authorize`] says no
    pub fn require(&self, session: &Session, path: &TopicPath, action: Action) -> PortalResult<()> {
        if self.authorize(session, path, action) {
            return Ok(());
        }
        tracing::warn!(user = session.username(), path = %path, %action, "denied");
        Err(AccessError::unauthorized(session.username(), path, action).into())
    }

    fn require_role(&self, session: &Session, required: Role) -> PortalResult<&UserAccount> {
        let account = self.account(session)?;
        let allowed = match required {
            Role::Admin => account.role.is_admin(),
            Role::Editor => account.role.manages_announcements(),
            Role::User => true,
        };
        if allowed {
            Ok(account)
        } else {
            tracing::warn!(user = session.username(), %required, "role required");
            Err(PortalError::RoleRequired {
                user: session.username().to_string(),
                required,
            })
        }
    }

    fn require_editor_tools(&self) -> PortalResult<()> {
        if self.store.settings.display.feature_toggles.editor_tools {
            Ok(())
        } else {
            Err(PortalError::FeatureDisabled(Feature::EditorTools))
        }
    }

    /// Whether a topic shows up in navigation for the session
    ///
    /// With view grants enforced, ancestors of a granted topic stay listed
    /// so the granted topic can be reached.
    fn can_navigate(&self, session: &Session, path: &TopicPath) -> bool {
        if !self.config().enforce_view_grants {
            return true;
        }
        self.resolver().can_reach(session.username(), path, Action::View)
    }

    /// Answer an authorization question about any user
    ///
    /// Pure; needs no session.
    #[must_use]
    pub fn check(&self, user: &str, path: &TopicPath, action: Action) -> bool {
        self.resolver().authorize(user, path, action)
    }

    // ------------------------------------------------------------------
    // Reading
    // ------------------------------------------------------------------

    /// Project the topic under the session's cursor
    ///
    /// A cursor that no longer resolves is sent home first.
    ///
    /// # Errors
    /// - `Access(UnknownUser)` if the account was deleted
    /// - `Access(Unauthorized)` when neither the topic nor anything below
    ///   it is viewable
    pub fn page(&self, session: &mut Session) -> PortalResult<Page> {
        let account = self.account(session)?;
        let tree = &*self.store.tree;
        let id = match tree.resolve(session.nav.current()) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(user = session.username(), error = %e, "cursor reset to home");
                session.nav.home();
                tree.root()
            }
        };
        let path = session.nav.current().clone();
        if !path.is_root() && !self.can_navigate(session, &path) {
            return Err(AccessError::unauthorized(session.username(), &path, Action::View).into());
        }
        // A topic reachable only on the way to a granted descendant lists
        // its children but nothing of its own
        let can_view = path.is_root() || self.authorize(session, &path, Action::View);

        let settings = &*self.store.settings;
        let display = &settings.display;
        let toggles = display.feature_toggles;

        let mut children = Vec::new();
        for entry in tree.list_children(id, &settings.ordering, &settings.visible_sections)? {
            let child_path = path.child(entry.name);
            if !self.can_navigate(session, &child_path) {
                continue;
            }
            children.push(ChildLink {
                name: entry.name.to_string(),
                icon: tree.node(entry.id)?.icon_or(&display.appearance.default_icon).to_string(),
                path: child_path,
            });
        }

        let attachments = if path.is_root() || !can_view {
            Vec::new()
        } else {
            self.store
                .attachments
                .list(&path)?
                .into_iter()
                .map(AttachmentLink::from)
                .collect()
        };

        let announcements = (path.is_root() && toggles.announcements)
            .then(|| self.store.announcements.iter().map(str::to_string).collect());

        let is_admin = account.role.is_admin();
        Ok(Page {
            breadcrumb: breadcrumb(&path),
            header: display
                .header
                .effective(|logo| self.store.attachments.has_logo(logo))
                .into(),
            children,
            content: if can_view {
                open_links_in_new_tab(tree.node(id)?.content()).into_owned()
            } else {
                String::new()
            },
            attachments,
            can_edit: toggles.editor_tools && self.authorize(session, &path, Action::Edit),
            announcements,
            can_manage_announcements: account.role.manages_announcements(),
            menu: Menu {
                manage_users: toggles.user_management && is_admin,
                settings: toggles.settings_menu && is_admin,
            },
            path,
        })
    }

    /// Search names and content, keeping only topics the session may view
    #[must_use]
    pub fn search(&self, session: &Session, query: &str) -> Vec<TopicPath> {
        self.store
            .tree
            .search(query)
            .filter(|path| self.authorize(session, path, Action::View))
            .collect()
    }

    /// Every account with its role
    ///
    /// # Errors
    /// `RoleRequired` unless the session is an admin
    pub fn list_users(&self, session: &Session) -> PortalResult<Vec<(String, Role)>> {
        self.require_role(session, Role::Admin)?;
        Ok(self
            .store
            .users
            .iter()
            .map(|a| (a.username.clone(), a.role))
            .collect())
    }

    // ------------------------------------------------------------------
    // Topics and attachments
    // ------------------------------------------------------------------

    /// Replace a topic's content
    ///
    /// # Errors
    /// `FeatureDisabled`, `Unauthorized`, `PathNotFound` or a save failure
    pub fn set_content(&mut self, session: &Session, path: &TopicPath, text: &str) -> PortalResult<()> {
        self.require_editor_tools()?;
        self.require(session, path, Action::Edit)?;
        let id = self.store.tree.resolve(path)?;
        self.store.tree.set_content(id, text)?;
        self.store.tree.save()?;
        tracing::info!(user = session.username(), path = %path, "content saved");
        Ok(())
    }

    /// Create a subtopic under `parent`
    ///
    /// # Errors
    /// `FeatureDisabled`, `Unauthorized`, tree errors or a save failure
    pub fn add_subtopic(
        &mut self,
        session: &Session,
        parent: &TopicPath,
        name: &str,
        icon: Option<&str>,
    ) -> PortalResult<TopicPath> {
        self.require_editor_tools()?;
        self.require(session, parent, Action::Edit)?;
        self.store.ensure_tree_and_settings_fresh()?;
        let store = &mut self.store;
        let parent_id = store.tree.resolve(parent)?;
        store.tree.add_child(parent_id, name, icon, &mut *store.settings)?;
        self.commit_structure()?;
        Ok(parent.child(name))
    }

    /// Rename a subtopic of `parent`, carrying grants, ordering and files
    ///
    /// # Errors
    /// `FeatureDisabled`, `Unauthorized`, tree errors or a save failure
    pub fn rename_subtopic(
        &mut self,
        session: &Session,
        parent: &TopicPath,
        old: &str,
        new: &str,
    ) -> PortalResult<TopicPath> {
        self.require_editor_tools()?;
        self.require(session, parent, Action::Edit)?;
        self.store.ensure_tree_and_settings_fresh()?;
        let store = &mut self.store;
        let parent_id = store.tree.resolve(parent)?;
        store.tree.rename_child(parent_id, old, new, &mut *store.settings)?;
        self.commit_structure()?;
        self.store
            .attachments
            .rename_namespace(&parent.child(old), &parent.child(new))?;
        Ok(parent.child(new))
    }

    /// Delete a subtopic of `parent` with its subtree, grants and files
    ///
    /// # Errors
    /// `FeatureDisabled`, `Unauthorized`, tree errors or a save failure
    pub fn remove_subtopic(
        &mut self,
        session: &Session,
        parent: &TopicPath,
        name: &str,
    ) -> PortalResult<Vec<TopicPath>> {
        self.require_editor_tools()?;
        self.require(session, parent, Action::Edit)?;
        self.store.ensure_tree_and_settings_fresh()?;
        let store = &mut self.store;
        let parent_id = store.tree.resolve(parent)?;
        let removed = store.tree.remove_child(parent_id, name, &mut *store.settings)?;
        self.commit_structure()?;
        self.store.attachments.remove_namespace(&parent.child(name))?;
        Ok(removed)
    }

    /// Write a structural change to the tree and settings
    ///
    /// On failure both documents are read back from disk so memory never
    /// holds a change the files do not.
    fn commit_structure(&mut self) -> PortalResult<()> {
        let Err(e) = self.store.save_tree_and_settings() else {
            return Ok(());
        };
        for reloaded in [self.store.tree.reload(), self.store.settings.reload()] {
            if let Err(reload) = reloaded {
                tracing::warn!(error = %reload, "reload after failed save");
            }
        }
        Err(e.into())
    }

    /// Upload a file to a topic
    ///
    /// # Errors
    /// `FeatureDisabled`, `Unauthorized`, `PathNotFound` or a store error
    pub fn attach(&mut self, session: &Session, path: &TopicPath, name: &str, bytes: &[u8]) -> PortalResult<()> {
        self.require_editor_tools()?;
        self.require(session, path, Action::Edit)?;
        self.store.tree.resolve(path)?;
        self.store.attachments.put(path, name, bytes)?;
        Ok(())
    }

    /// Delete a file from a topic
    ///
    /// # Errors
    /// `FeatureDisabled`, `Unauthorized` or a store error
    pub fn detach(&mut self, session: &Session, path: &TopicPath, name: &str) -> PortalResult<()> {
        self.require_editor_tools()?;
        self.require(session, path, Action::Edit)?;
        self.store.attachments.remove(path, name)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Privileges and accounts
    // ------------------------------------------------------------------

    /// Replace `user`'s grant set on `path`
    ///
    /// # Errors
    /// `RoleRequired`, `UnknownUser`, `PathNotFound` or a save failure
    pub fn grant(&mut self, session: &Session, user: &str, path: &TopicPath, actions: ActionSet) -> PortalResult<()> {
        self.require_role(session, Role::Admin)?;
        if !self.store.users.contains(user) {
            return Err(AccessError::UnknownUser(user.to_string()).into());
        }
        self.store.tree.resolve(path)?;
        self.store.settings.user_privileges.grant(user, path.clone(), actions);
        self.store.settings.save()?;
        Ok(())
    }

    /// Create an account
    ///
    /// # Errors
    /// `RoleRequired`, account errors or a save failure
    pub fn add_user(&mut self, session: &Session, username: &str, password: &str, role: Role) -> PortalResult<()> {
        self.require_role(session, Role::Admin)?;
        self.store.users.add_user(username, password, role)?;
        self.store.users.save()?;
        Ok(())
    }

    /// Change an account's role
    ///
    /// # Errors
    /// `RoleRequired`, `UnknownUser` or a save failure
    pub fn set_role(&mut self, session: &Session, username: &str, role: Role) -> PortalResult<()> {
        self.require_role(session, Role::Admin)?;
        self.store.users.update_user(username, Some(role), None)?;
        self.store.users.save()?;
        Ok(())
    }

    /// Change a password; admins may change anyone's, users only their own
    ///
    /// # Errors
    /// `RoleRequired`, `UnknownUser` or a save failure
    pub fn change_password(&mut self, session: &Session, username: &str, password: &str) -> PortalResult<()> {
        if session.username() != username {
            self.require_role(session, Role::Admin)?;
        }
        self.store.users.update_user(username, None, Some(password))?;
        self.store.users.save()?;
        Ok(())
    }

    /// Delete an account and every grant it held
    ///
    /// # Errors
    /// `RoleRequired`, `ProtectedAccount`, `UnknownUser` or a save failure
    pub fn remove_user(&mut self, session: &Session, username: &str) -> PortalResult<()> {
        self.require_role(session, Role::Admin)?;
        self.store.users.remove_user(username)?;
        self.store.users.save()?;
        if self.store.settings.user_privileges.revoke_user(username) {
            self.store.settings.save()?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Announcements
    // ------------------------------------------------------------------

    /// Announcements, oldest first
    pub fn announcements(&self) -> impl Iterator<Item = &str> {
        self.store.announcements.iter()
    }

    /// Append an announcement; blank text is ignored
    ///
    /// # Errors
    /// `RoleRequired` for plain users, or a save failure
    pub fn post_announcement(&mut self, session: &Session, text: &str) -> PortalResult<bool> {
        self.require_role(session, Role::Editor)?;
        if !self.store.announcements.post(text) {
            return Ok(false);
        }
        self.store.announcements.save()?;
        Ok(true)
    }

    /// Remove the announcement at a 0-based position
    ///
    /// # Errors
    /// `RoleRequired`, `NoSuchAnnouncement` or a save failure
    pub fn remove_announcement(&mut self, session: &Session, index: usize) -> PortalResult<String> {
        self.require_role(session, Role::Editor)?;
        let removed = self
            .store
            .announcements
            .remove(index)
            .ok_or(PortalError::NoSuchAnnouncement(index))?;
        self.store.announcements.save()?;
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    /// Edit the display settings
    ///
    /// The font size is clamped after `edit` runs.
    ///
    /// # Errors
    /// `RoleRequired` or a save failure
    pub fn update_display(&mut self, session: &Session, edit: impl FnOnce(&mut DisplaySettings)) -> PortalResult<()> {
        self.require_role(session, Role::Admin)?;
        let display = &mut self.store.settings.display;
        edit(display);
        let size = display.appearance.font_size;
        display.appearance.set_font_size(size);
        self.store.settings.save()?;
        tracing::info!(user = session.username(), "display settings saved");
        Ok(())
    }

    /// Restore default display settings
    ///
    /// # Errors
    /// `RoleRequired` or a save failure
    pub fn reset_display(&mut self, session: &Session) -> PortalResult<()> {
        self.require_role(session, Role::Admin)?;
        self.store.settings.reset_display();
        self.store.settings.save()?;
        Ok(())
    }

    /// Show or hide a top-level topic in navigation
    ///
    /// # Errors
    /// `RoleRequired`, `PathNotFound` or a save failure
    pub fn set_visibility(&mut self, session: &Session, topic: &str, visible: bool) -> PortalResult<()> {
        self.require_role(session, Role::Admin)?;
        self.store.tree.resolve(&TopicPath::single(topic))?;
        self.store.settings.visible_sections.set(topic, visible);
        self.store.settings.save()?;
        Ok(())
    }

    /// Replace the display order of `parent`'s children
    ///
    /// # Errors
    /// `RoleRequired`, `PathNotFound` or a save failure
    pub fn set_order(&mut self, session: &Session, parent: &TopicPath, order: Vec<String>) -> PortalResult<()> {
        self.require_role(session, Role::Admin)?;
        self.store.tree.resolve(parent)?;
        self.store.settings.ordering.set_order(parent.clone(), order);
        self.store.settings.save()?;
        Ok(())
    }

    /// Store a header logo and select it
    ///
    /// # Errors
    /// `RoleRequired`, a rejected file or a save failure
    pub fn upload_logo(&mut self, session: &Session, name: &str, bytes: &[u8]) -> PortalResult<String> {
        self.require_role(session, Role::Admin)?;
        let stored = self.store.attachments.put_logo(name, bytes)?;
        self.store.settings.display.header.header_logo = Some(stored.clone());
        self.store.settings.save()?;
        Ok(stored)
    }
}

fn validate_config(config: &PortalConfig) -> PortalResult<()> {
    if config.initial_admin_password.is_empty() {
        return Err(PortalError::Config("initial_admin_password must not be empty".into()));
    }
    Ok(())
}
