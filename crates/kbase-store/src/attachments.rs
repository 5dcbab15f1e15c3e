//! Attachment blobs keyed by topic path
//!
//! Each topic owns a namespace directory mirroring its path:
//! `<root>/n_<seg1>/n_<seg2>/files/<name>`. Segments are percent-encoded, and
//! the `n_` prefix keeps a topic called `files` apart from the blob
//! directory. Removing or renaming a topic moves its whole subtree of
//! attachments with one directory operation.

use crate::document::write_atomic;
use crate::error::{StoreError, StoreResult};
use kbase_tree::TopicPath;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Extensions accepted for upload
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "pdf", "xlsx", "xls", "docx"];

/// Extensions rendered as image previews
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

const FILES_DIR: &str = "files";
const SEGMENT_PREFIX: &str = "n_";
const LOGO_PREFIX: &str = "header_logo_";

/// One stored file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub size: u64,
    pub is_image: bool,
}

/// Blob store rooted at the upload directory
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    root: PathBuf,
}

impl AttachmentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory owning `path` and everything below it
    #[must_use]
    pub fn namespace_dir(&self, path: &TopicPath) -> PathBuf {
        let mut dir = self.root.clone();
        for segment in path.iter() {
            dir.push(format!("{SEGMENT_PREFIX}{}", urlencoding::encode(segment)));
        }
        dir
    }

    fn files_dir(&self, path: &TopicPath) -> PathBuf {
        self.namespace_dir(path).join(FILES_DIR)
    }

    /// Store a file, replacing any file of the same name
    ///
    /// # Errors
    /// - `InvalidFileName` / `UnsupportedFileType` for rejected names
    /// - `Io` on write failure
    pub fn put(&self, path: &TopicPath, name: &str, bytes: &[u8]) -> StoreResult<PathBuf> {
        validate_file_name(name)?;
        check_extension(name, ALLOWED_EXTENSIONS)?;
        let target = self.files_dir(path).join(name);
        write_atomic(&target, bytes)?;
        tracing::info!(path = %path, file = name, bytes = bytes.len(), "attachment stored");
        Ok(target)
    }

    /// Files attached to exactly `path`, sorted by name
    ///
    /// # Errors
    /// `Io` if the directory exists but cannot be read
    pub fn list(&self, path: &TopicPath) -> StoreResult<Vec<Attachment>> {
        let dir = self.files_dir(path);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io_error(&dir, e)),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io_error(&dir, e))?;
            let meta = entry.metadata().map_err(|e| StoreError::io_error(entry.path(), e))?;
            if !meta.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            files.push(Attachment {
                is_image: is_image(&name),
                name,
                size: meta.len(),
            });
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// Location of an existing attachment
    ///
    /// # Errors
    /// `InvalidFileName` or `AttachmentNotFound`
    pub fn file_path(&self, path: &TopicPath, name: &str) -> StoreResult<PathBuf> {
        validate_file_name(name)?;
        let file = self.files_dir(path).join(name);
        if file.is_file() {
            Ok(file)
        } else {
            Err(StoreError::AttachmentNotFound {
                path: path.clone(),
                name: name.to_string(),
            })
        }
    }

    /// Read an attachment
    ///
    /// # Errors
    /// As [`AttachmentStore::file_path`], plus `Io`
    pub fn read(&self, path: &TopicPath, name: &str) -> StoreResult<Vec<u8>> {
        let file = self.file_path(path, name)?;
        std::fs::read(&file).map_err(|e| StoreError::io_error(file, e))
    }

    /// Delete one attachment
    ///
    /// # Errors
    /// `InvalidFileName`, `AttachmentNotFound` or `Io`
    pub fn remove(&self, path: &TopicPath, name: &str) -> StoreResult<()> {
        let file = self.file_path(path, name)?;
        std::fs::remove_file(&file).map_err(|e| StoreError::io_error(file, e))?;
        tracing::info!(path = %path, file = name, "attachment removed");
        Ok(())
    }

    /// Delete every attachment at or below `path`
    ///
    /// For the root only the root's own files go; topic namespaces stay.
    /// Returns whether anything was there.
    ///
    /// # Errors
    /// `Io` on failure
    pub fn remove_namespace(&self, path: &TopicPath) -> StoreResult<bool> {
        let dir = if path.is_root() {
            self.files_dir(path)
        } else {
            self.namespace_dir(path)
        };
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => {
                tracing::info!(path = %path, "attachment namespace removed");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io_error(dir, e)),
        }
    }

    /// Move every attachment at or below `from` to `to`
    ///
    /// A leftover namespace at `to` is replaced. Returns whether anything
    /// moved.
    ///
    /// # Errors
    /// `Io` on failure
    pub fn rename_namespace(&self, from: &TopicPath, to: &TopicPath) -> StoreResult<bool> {
        if from.is_root() || to.is_root() || from == to {
            return Ok(false);
        }
        let source = self.namespace_dir(from);
        if !source.is_dir() {
            return Ok(false);
        }
        let target = self.namespace_dir(to);
        if target.exists() {
            tracing::warn!(path = %to, "replacing leftover attachment namespace");
            std::fs::remove_dir_all(&target).map_err(|e| StoreError::io_error(&target, e))?;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io_error(parent, e))?;
        }
        std::fs::rename(&source, &target).map_err(|e| StoreError::io_error(&source, e))?;
        tracing::info!(from = %from, to = %to, "attachment namespace moved");
        Ok(true)
    }

    /// Store a header logo and return its file name
    ///
    /// # Errors
    /// `InvalidFileName`, `UnsupportedFileType` (images only) or `Io`
    pub fn put_logo(&self, name: &str, bytes: &[u8]) -> StoreResult<String> {
        validate_file_name(name)?;
        check_extension(name, IMAGE_EXTENSIONS)?;
        let file_name = format!("{LOGO_PREFIX}{name}");
        write_atomic(&self.root.join(&file_name), bytes)?;
        tracing::info!(file = %file_name, "header logo stored");
        Ok(file_name)
    }

    /// Whether a stored logo file exists
    #[must_use]
    pub fn has_logo(&self, file_name: &str) -> bool {
        validate_file_name(file_name).is_ok() && self.root.join(file_name).is_file()
    }
}

/// Reject empty names, dot entries and anything with a path separator
///
/// # Errors
/// `InvalidFileName`
pub fn validate_file_name(name: &str) -> StoreResult<()> {
    let bad = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if bad {
        return Err(StoreError::InvalidFileName(name.to_string()));
    }
    Ok(())
}

/// Whether a file is shown as an image preview
#[must_use]
pub fn is_image(name: &str) -> bool {
    extension(name).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

fn extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

fn check_extension(name: &str, allowed: &[&str]) -> StoreResult<()> {
    match extension(name) {
        Some(ext) if allowed.contains(&ext.as_str()) => Ok(()),
        _ => Err(StoreError::UnsupportedFileType(name.to_string())),
    }
}
