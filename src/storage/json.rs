//! JSON file-based key-value substrate.
//!
//! Each key maps to `<root>/<key>.json`. Writes go to a temporary sibling file
//! which is then renamed over the target, so a crash never leaves a torn
//! document on disk.
//!
//! # Performance Characteristics
//!
//! - **Read**: O(n) - reads the whole file for the key
//! - **Write**: O(n) - rewrites the whole file for the key
//! - **Best for**: small personal collections, infrequent writes

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::domain::error::{MoodlogError, Result};
use crate::storage::backend::KeyValueStore;

/// File extension for stored documents.
const DOCUMENT_EXTENSION: &str = "json";

/// JSON file storage backend.
///
/// # File Layout
///
/// ```text
/// <root>/
///   users.json      [{"id": "...", "name": "...", "email": "...", "secret": "$argon2id$..."}]
///   journals.json   [{"id": "...", "title": "...", "content": "...", "date": "...", "mood": {...}}]
///   session.json    {"account": {"id": "...", "name": "...", "email": "..."}}
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    /// Directory holding one document per key.
    root: PathBuf,
}

impl JsonFileStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use moodlog::storage::JsonFileStore;
    /// use std::path::PathBuf;
    ///
    /// let store = JsonFileStore::open(PathBuf::from("/tmp/moodlog"))?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(root: PathBuf) -> Result<Self> {
        tracing::debug!(root = ?root, "opening JSON file store");
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Directory this store writes into.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves the document path for `key`.
    ///
    /// Keys are fixed identifiers chosen by the crate; anything that could
    /// escape the root directory is rejected.
    fn document_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(MoodlogError::Storage(format!("invalid storage key: {key:?}")));
        }
        Ok(self.root.join(format!("{key}.{DOCUMENT_EXTENSION}")))
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    #[tracing::instrument(name = "json_get", level = "debug", skip(self))]
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.document_path(key)?;

        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                tracing::debug!(bytes = contents.len(), "document read");
                Ok(Some(contents))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("document absent");
                Ok(None)
            }
            Err(e) => Err(MoodlogError::Storage(format!("failed to read {}: {e}", path.display()))),
        }
    }

    #[tracing::instrument(name = "json_set", level = "debug", skip(self, value), fields(bytes = value.len()))]
    async fn set(&self, key: &str, value: String) -> Result<()> {
        let path = self.document_path(key)?;

        let tmp_path = path.with_extension("tmp");

        tracing::trace!(tmp_path = ?tmp_path, "writing to temporary file");
        tokio::fs::write(&tmp_path, value)
            .await
            .map_err(|e| MoodlogError::Storage(format!("failed to write {}: {e}", tmp_path.display())))?;

        tracing::trace!("renaming temporary file to final location");
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| MoodlogError::Storage(format!("failed to replace {}: {e}", path.display())))?;

        tracing::debug!("document saved");
        Ok(())
    }
}
