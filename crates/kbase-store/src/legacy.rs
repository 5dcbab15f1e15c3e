//! Import of portal data in the legacy layout
//!
//! The legacy portal kept plaintext passwords, keyed privileges by
//! ` / `-joined strings, keyed nested ordering lists by the parent's bare
//! name and stored uploads under `uploads/<segments joined by _>`. Import
//! converts all of it into the current documents. Anything that cannot be
//! mapped unambiguously is dropped and reported.

use crate::announcements::AnnouncementFeed;
use crate::attachments::AttachmentStore;
use crate::config::PortalConfig;
use crate::document::Document;
use crate::error::{StoreError, StoreResult};
use crate::settings::{DisplaySettings, SettingsDocument};
use indexmap::IndexMap;
use kbase_access::{Action, ActionSet, Role, UserDirectory};
use kbase_tree::{ContentTree, TopicPath};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

const TREE_FILES: &[&str] = &["bsnl_data.json", "data.json"];
const USERS_FILE: &str = "users.json";
const SETTINGS_FILE: &str = "settings.json";
const NOTICE_FILE: &str = "announcements.json";
const UPLOAD_DIR: &str = "uploads";
const HOME_KEY: &str = "home";

/// Outcome of a legacy import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub topics: usize,
    pub users: usize,
    pub announcements: usize,
    pub attachments: usize,
    /// Entries that were dropped, one line each
    pub warnings: Vec<String>,
}

impl ImportReport {
    fn warn(&mut self, message: String) {
        tracing::warn!("{message}");
        self.warnings.push(message);
    }
}

#[derive(Debug, Deserialize)]
struct LegacyUser {
    #[serde(default)]
    password: String,
    #[serde(default)]
    role: Role,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LegacySettings {
    #[serde(flatten)]
    display: DisplaySettings,
    visible_sections: IndexMap<String, bool>,
    user_privileges: BTreeMap<String, IndexMap<String, Vec<String>>>,
    topic_order: Vec<String>,
    subtopic_order: IndexMap<String, Vec<String>>,
}

/// Convert a legacy data directory into the configured documents
///
/// Target documents must not exist yet; an existing file is reported as
/// `StaleWrite` and nothing after it is written.
///
/// # Errors
/// - `Io` / `Json` if a legacy file is unreadable
/// - `StaleWrite` if a target document already exists
pub fn import_legacy(source: &Path, config: &PortalConfig) -> StoreResult<ImportReport> {
    let mut report = ImportReport::default();

    let tree_path = TREE_FILES
        .iter()
        .map(|name| source.join(name))
        .find(|p| p.is_file())
        .unwrap_or_else(|| source.join(TREE_FILES[0]));
    let tree: ContentTree = read_json(&tree_path)?.unwrap_or_default();
    report.topics = tree.len();

    let legacy_settings: LegacySettings = read_json(&source.join(SETTINGS_FILE))?.unwrap_or_default();
    let legacy_users: IndexMap<String, LegacyUser> = read_json(&source.join(USERS_FILE))?.unwrap_or_default();
    let notices: Vec<String> = read_json(&source.join(NOTICE_FILE))?.unwrap_or_default();

    let attachments = AttachmentStore::new(config.upload_path());
    let mut settings = convert_settings(legacy_settings, &tree, &mut report);
    import_logo(source, &attachments, &mut settings.display, &mut report)?;
    settings.reconcile(&tree);

    let mut users = UserDirectory::new();
    for (name, user) in legacy_users {
        match users.add_user(&name, &user.password, user.role) {
            Ok(_) => report.users += 1,
            Err(e) => report.warn(format!("user '{name}' skipped: {e}")),
        }
    }

    let mut feed = AnnouncementFeed::new();
    for notice in notices {
        if feed.post(notice) {
            report.announcements += 1;
        }
    }

    let policy = config.write_policy;
    Document::detached(config.tree_path(), tree.clone(), policy).save()?;
    Document::detached(config.settings_path(), settings, policy).save()?;
    Document::detached(config.users_path(), users, policy).save()?;
    Document::detached(config.announcements_path(), feed, policy).save()?;

    import_uploads(&source.join(UPLOAD_DIR), &tree, &attachments, &mut report)?;

    tracing::info!(
        topics = report.topics,
        users = report.users,
        announcements = report.announcements,
        attachments = report.attachments,
        warnings = report.warnings.len(),
        "legacy import finished"
    );
    Ok(report)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> StoreResult<Option<T>> {
    match std::fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::json_error(path, e)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io_error(path, e)),
    }
}

fn convert_settings(legacy: LegacySettings, tree: &ContentTree, report: &mut ImportReport) -> SettingsDocument {
    let mut settings = SettingsDocument {
        display: legacy.display,
        ..SettingsDocument::default()
    };

    for (topic, visible) in legacy.visible_sections {
        settings.visible_sections.set(topic, visible);
    }

    // Root list: explicit topic order, then anything added at home later
    let mut root_order = legacy.topic_order;
    let mut nested = legacy.subtopic_order;
    if let Some(home) = nested.shift_remove(HOME_KEY) {
        for name in home {
            if !root_order.contains(&name) {
                root_order.push(name);
            }
        }
    }
    if !root_order.is_empty() {
        settings.ordering.set_order(TopicPath::root(), root_order);
    }

    let by_name = paths_by_name(tree);
    for (parent, order) in nested {
        match by_name.get(parent.as_str()).map(Vec::as_slice) {
            Some([only]) => settings.ordering.set_order(only.clone(), order),
            Some(many) if many.len() > 1 => {
                report.warn(format!("ordering for '{parent}' dropped: {} topics share the name", many.len()));
            }
            _ => report.warn(format!("ordering for '{parent}' dropped: no such topic")),
        }
    }

    for (user, grants) in legacy.user_privileges {
        for (key, actions) in grants {
            let path: TopicPath = match key.parse() {
                Ok(path) => path,
                Err(e) => {
                    report.warn(format!("grant '{key}' for '{user}' dropped: {e}"));
                    continue;
                }
            };
            if tree.resolve(&path).is_err() {
                report.warn(format!("grant '{key}' for '{user}' dropped: no such topic"));
                continue;
            }
            let mut set = ActionSet::new();
            for action in actions {
                match action.parse::<Action>() {
                    Ok(action) => {
                        set.insert(action);
                    }
                    Err(e) => report.warn(format!("grant '{key}' for '{user}': {e}")),
                }
            }
            settings.user_privileges.grant(&user, path, set);
        }
    }

    settings
}

/// Topic name → every path ending in it
fn paths_by_name(tree: &ContentTree) -> HashMap<String, Vec<TopicPath>> {
    let mut map: HashMap<String, Vec<TopicPath>> = HashMap::new();
    for path in tree.all_paths() {
        if let Some(name) = path.name() {
            map.entry(name.to_string()).or_default().push(path.clone());
        }
    }
    map
}

fn import_logo(
    source: &Path,
    attachments: &AttachmentStore,
    display: &mut DisplaySettings,
    report: &mut ImportReport,
) -> StoreResult<()> {
    let Some(logo) = display.header.header_logo.take().filter(|l| !l.is_empty()) else {
        return Ok(());
    };
    let legacy_path = source.join(&logo);
    let Some(name) = legacy_path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        report.warn(format!("header logo '{logo}' dropped: no file name"));
        return Ok(());
    };
    let Ok(bytes) = std::fs::read(&legacy_path) else {
        report.warn(format!("header logo '{logo}' dropped: file missing"));
        return Ok(());
    };
    let name = name.strip_prefix("header_logo_").unwrap_or(&name).to_string();
    match attachments.put_logo(&name, &bytes) {
        Ok(stored) => display.header.header_logo = Some(stored),
        Err(e) => report.warn(format!("header logo '{logo}' dropped: {e}")),
    }
    Ok(())
}

fn import_uploads(
    uploads: &Path,
    tree: &ContentTree,
    attachments: &AttachmentStore,
    report: &mut ImportReport,
) -> StoreResult<()> {
    let entries = match std::fs::read_dir(uploads) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(StoreError::io_error(uploads, e)),
    };

    let mut by_key: HashMap<String, TopicPath> = HashMap::new();
    by_key.insert(HOME_KEY.to_string(), TopicPath::root());
    for path in tree.all_paths() {
        let key = path.join("_");
        if let Some(existing) = by_key.get(&key) {
            report.warn(format!("uploads key '{key}' is ambiguous, using '{existing}'"));
            continue;
        }
        by_key.insert(key, path);
    }

    for entry in entries {
        let entry = entry.map_err(|e| StoreError::io_error(uploads, e))?;
        let dir: PathBuf = entry.path();
        if !dir.is_dir() {
            continue;
        }
        let key = entry.file_name().to_string_lossy().into_owned();
        let Some(path) = by_key.get(&key) else {
            report.warn(format!("uploads directory '{key}' matches no topic"));
            continue;
        };
        let files = std::fs::read_dir(&dir).map_err(|e| StoreError::io_error(&dir, e))?;
        for file in files {
            let file = file.map_err(|e| StoreError::io_error(&dir, e))?;
            let name = file.file_name().to_string_lossy().into_owned();
            let bytes = std::fs::read(file.path()).map_err(|e| StoreError::io_error(file.path(), e))?;
            match attachments.put(path, &name, &bytes) {
                Ok(_) => report.attachments += 1,
                Err(e) => report.warn(format!("upload '{key}/{name}' skipped: {e}")),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_ordering_mapped_by_unique_name() {
        let tree = ContentTree::from_json(&serde_json::json!({
            "A": { "subtopics": { "dup": {}, "x": { "subtopics": { "y1": {}, "y2": {} } } } },
            "B": { "subtopics": { "dup": {} } }
        }))
        .unwrap();
        let legacy = LegacySettings {
            topic_order: vec!["B".into()],
            subtopic_order: IndexMap::from([
                ("home".to_string(), vec!["A".to_string()]),
                ("x".to_string(), vec!["y2".to_string(), "y1".to_string()]),
                ("dup".to_string(), vec![]),
                ("gone".to_string(), vec![]),
            ]),
            ..LegacySettings::default()
        };

        let mut report = ImportReport::default();
        let settings = convert_settings(legacy, &tree, &mut report);

        assert_eq!(settings.ordering.order_for(&TopicPath::root()), &["B", "A"]);
        assert_eq!(settings.ordering.order_for(&TopicPath::from(["A", "x"])), &["y2", "y1"]);
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn string_keyed_grants_become_paths() {
        let tree = ContentTree::from_json(&serde_json::json!({ "Top": { "subtopics": { "Sub": {} } } })).unwrap();
        let legacy: LegacySettings = serde_json::from_value(serde_json::json!({
            "user_privileges": { "ravi": { "Top / Sub": ["view", "edit"], "Top": ["view", "fly"] } }
        }))
        .unwrap();

        let mut report = ImportReport::default();
        let settings = convert_settings(legacy, &tree, &mut report);
        let privileges = &settings.user_privileges;
        assert!(privileges.allows("ravi", &TopicPath::from(["Top", "Sub"]), Action::Edit));
        assert!(!privileges.allows("ravi", &TopicPath::single("Top"), Action::Edit));
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn grants_on_missing_topics_are_not_imported() {
        let tree = ContentTree::from_json(&serde_json::json!({ "Top": {} })).unwrap();
        let legacy: LegacySettings = serde_json::from_value(serde_json::json!({
            "user_privileges": { "ravi": { "Gone": ["view"], "Top": ["view"] } }
        }))
        .unwrap();

        let mut report = ImportReport::default();
        let settings = convert_settings(legacy, &tree, &mut report);
        let privileges = &settings.user_privileges;
        assert!(!privileges.allows("ravi", &TopicPath::single("Gone"), Action::View));
        assert!(privileges.allows("ravi", &TopicPath::single("Top"), Action::View));
        assert_eq!(report.warnings, vec!["grant 'Gone' for 'ravi' dropped: no such topic".to_string()]);
    }
}
