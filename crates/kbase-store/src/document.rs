//! Whole-document JSON persistence
//!
//! A [`Document`] is loaded whole and written whole. It remembers the
//! [`VersionStamp`] of the bytes it was read from; under
//! [`WritePolicy::Optimistic`] a save is refused when the file no longer
//! carries that stamp.

use crate::config::WritePolicy;
use crate::error::{StoreError, StoreResult};
use crate::stamp::{describe, VersionStamp};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{ErrorKind, Write};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

/// A JSON document bound to a file
#[derive(Debug, Clone)]
pub struct Document<T> {
    path: PathBuf,
    value: T,
    stamp: Option<VersionStamp>,
    policy: WritePolicy,
}

impl<T> Document<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Load a document, or start from `T::default()` when the file is absent
    ///
    /// # Errors
    /// - `Io` if the file exists but cannot be read
    /// - `Json` if the content does not decode as `T`
    pub fn load(path: impl Into<PathBuf>, policy: WritePolicy) -> StoreResult<Self> {
        let path = path.into();
        let (value, stamp) = match read_file(&path)? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes).map_err(|e| StoreError::json_error(&path, e))?;
                (value, Some(VersionStamp::compute(&bytes)))
            }
            None => {
                tracing::debug!(path = %path.display(), "document absent, using defaults");
                (T::default(), None)
            }
        };
        tracing::debug!(path = %path.display(), stamp = %describe(stamp), "document loaded");
        Ok(Self {
            path,
            value,
            stamp,
            policy,
        })
    }

    /// Write the document back to its file
    ///
    /// The bytes go to a temporary file in the same directory which is then
    /// renamed over the target.
    ///
    /// # Errors
    /// - `StaleWrite` if the file changed since load (optimistic policy only)
    /// - `Io` / `Json` on write or encode failure
    pub fn save(&mut self) -> StoreResult<()> {
        self.ensure_fresh()?;
        let bytes = encode(&self.value).map_err(|e| StoreError::json_error(&self.path, e))?;
        write_atomic(&self.path, &bytes)?;
        self.stamp = Some(VersionStamp::compute(&bytes));
        tracing::debug!(path = %self.path.display(), stamp = %describe(self.stamp), "document saved");
        Ok(())
    }

    /// Discard in-memory changes and read the file again
    ///
    /// # Errors
    /// As [`Document::load`]
    pub fn reload(&mut self) -> StoreResult<()> {
        *self = Self::load(self.path.clone(), self.policy)?;
        Ok(())
    }
}

impl<T> Document<T> {
    /// Check that the file still carries the loaded stamp, without writing
    ///
    /// Always succeeds under [`WritePolicy::LastWriteWins`].
    ///
    /// # Errors
    /// - `StaleWrite` if the file changed since load
    /// - `Io` if the file cannot be read
    pub fn ensure_fresh(&self) -> StoreResult<()> {
        if self.policy == WritePolicy::LastWriteWins {
            return Ok(());
        }
        let found = read_file(&self.path)?.map(|bytes| VersionStamp::compute(&bytes));
        if found == self.stamp {
            return Ok(());
        }
        tracing::warn!(
            path = %self.path.display(),
            expected = %describe(self.stamp),
            found = %describe(found),
            "refusing stale write"
        );
        Err(StoreError::StaleWrite {
            path: self.path.clone(),
            expected: describe(self.stamp),
            found: describe(found),
        })
    }

    /// Wrap a value that has not been read from disk
    ///
    /// Saving it succeeds only while the file does not exist (optimistic
    /// policy).
    pub fn detached(path: impl Into<PathBuf>, value: T, policy: WritePolicy) -> Self {
        Self {
            path: path.into(),
            value,
            stamp: None,
            policy,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stamp of the bytes last read or written
    #[must_use]
    pub fn stamp(&self) -> Option<VersionStamp> {
        self.stamp
    }

    /// Whether the file existed when loaded (or has been saved since)
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.stamp.is_some()
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> Deref for Document<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for Document<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

fn read_file(path: &Path) -> StoreResult<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io_error(path, e)),
    }
}

/// Four-space indented JSON, the layout of existing portal files
fn encode<T: Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(out)
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| StoreError::io_error(dir, e))?;

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| StoreError::io_error(dir, e))?;
    temp.write_all(bytes).map_err(|e| StoreError::io_error(temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| StoreError::io_error(temp.path(), e))?;
    temp.persist(path)
        .map_err(|e| StoreError::io_error(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    type Doc = Document<BTreeMap<String, u32>>;

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let doc = Doc::load(dir.path().join("a.json"), WritePolicy::Optimistic).unwrap();
        assert!(doc.is_empty());
        assert!(!doc.is_persisted());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/a.json");
        let mut doc = Doc::load(&path, WritePolicy::Optimistic).unwrap();
        doc.insert("x".into(), 1);
        doc.save().unwrap();

        let again = Doc::load(&path, WritePolicy::Optimistic).unwrap();
        assert_eq!(again.get("x"), Some(&1));
        assert_eq!(again.stamp(), doc.stamp());
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n    \"x\": 1"));
    }

    #[test]
    fn concurrent_change_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        std::fs::write(&path, "{}").unwrap();

        let mut mine = Doc::load(&path, WritePolicy::Optimistic).unwrap();
        let mut theirs = Doc::load(&path, WritePolicy::Optimistic).unwrap();
        theirs.insert("t".into(), 2);
        theirs.save().unwrap();

        mine.insert("m".into(), 3);
        assert!(matches!(mine.ensure_fresh(), Err(StoreError::StaleWrite { .. })));
        assert!(matches!(mine.save(), Err(StoreError::StaleWrite { .. })));
        assert_eq!(Doc::load(&path, WritePolicy::Optimistic).unwrap().get("m"), None);

        mine.reload().unwrap();
        assert_eq!(mine.get("t"), Some(&2));
        mine.insert("m".into(), 3);
        mine.save().unwrap();
    }

    #[test]
    fn last_write_wins_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        std::fs::write(&path, "{}").unwrap();

        let mut mine = Doc::load(&path, WritePolicy::LastWriteWins).unwrap();
        std::fs::write(&path, r#"{"t": 9}"#).unwrap();
        mine.insert("m".into(), 3);
        mine.save().unwrap();

        let back = Doc::load(&path, WritePolicy::Optimistic).unwrap();
        assert_eq!(back.get("t"), None);
        assert_eq!(back.get("m"), Some(&3));
    }

    #[test]
    fn malformed_json_reported_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        std::fs::write(&path, "[1,").unwrap();
        let err = Doc::load(&path, WritePolicy::Optimistic).unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }));
        assert!(err.to_string().contains("a.json"));
    }
}
