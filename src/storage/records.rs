//! Typed record collections on top of a [`KeyValueStore`].
//!
//! A [`RecordStore`] reads and writes whole JSON documents under fixed keys:
//! arrays of records for accounts and journal entries, and a single value for
//! the persisted session. There is no indexing; every lookup is a linear scan
//! over the loaded collection.
//!
//! # Write Serialization
//!
//! [`RecordStore::update`] holds an async write lock across its
//! load-modify-save sequence, so two overlapping updates through the same
//! store cannot lose each other's effect. Plain [`RecordStore::save`] and
//! [`RecordStore::save_value`] take the same lock.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::error::{MoodlogError, Result};
use crate::storage::backend::KeyValueStore;

/// Key of the accounts collection.
pub const ACCOUNTS_KEY: &str = "users";

/// Key of the journal entry collection.
pub const JOURNALS_KEY: &str = "journals";

/// Key of the persisted session value.
pub const SESSION_KEY: &str = "session";

/// Typed access to JSON collections in a key-value substrate.
pub struct RecordStore {
    backend: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl RecordStore {
    /// Wraps a substrate.
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
        }
    }

    /// Loads the collection under `key`, or `None` if the key was never written.
    ///
    /// # Errors
    ///
    /// Returns [`MoodlogError::Storage`] if the read fails or the stored
    /// document is not a JSON array of `T`.
    pub async fn load_existing<T: DeserializeOwned>(&self, key: &str) -> Result<Option<Vec<T>>> {
        let Some(raw) = self.backend.get(key).await? else {
            return Ok(None);
        };
        let records: Vec<T> = serde_json::from_str(&raw)
            .map_err(|e| MoodlogError::Storage(format!("failed to parse {key}: {e}")))?;
        tracing::debug!(key, count = records.len(), "collection loaded");
        Ok(Some(records))
    }

    /// Loads the collection under `key`; an absent key is an empty collection.
    ///
    /// # Errors
    ///
    /// Same as [`RecordStore::load_existing`]. Unparsable contents are not
    /// treated as empty.
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        Ok(self.load_existing(key).await?.unwrap_or_default())
    }

    /// Replaces the collection under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the underlying write fails.
    pub async fn save<T: Serialize>(&self, key: &str, records: &[T]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write_collection(key, records).await
    }

    /// Loads the collection under `key`, applies `mutate`, and saves the result.
    ///
    /// The whole sequence runs under the write lock. If `mutate` returns an
    /// error nothing is written and the error is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns the error from loading, from `mutate`, or from saving.
    ///
    /// # Examples
    ///
    /// ```
    /// use moodlog::storage::{MemoryStore, RecordStore};
    /// use std::sync::Arc;
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let records = RecordStore::new(Arc::new(MemoryStore::new()));
    /// let len = records
    ///     .update("numbers", |items: &mut Vec<u32>| {
    ///         items.push(7);
    ///         Ok(items.len())
    ///     })
    ///     .await?;
    /// assert_eq!(len, 1);
    /// # Ok::<(), moodlog::MoodlogError>(())
    /// # }).unwrap();
    /// ```
    pub async fn update<T, R, F>(&self, key: &str, mutate: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned + Send,
        F: FnOnce(&mut Vec<T>) -> Result<R> + Send,
    {
        let _guard = self.write_lock.lock().await;

        let mut records: Vec<T> = self.load(key).await?;
        let outcome = mutate(&mut records)?;
        self.write_collection(key, &records).await?;

        Ok(outcome)
    }

    /// Loads a single JSON value stored under `key`.
    ///
    /// Returns `None` if the key is absent or holds JSON `null`.
    ///
    /// # Errors
    ///
    /// Returns [`MoodlogError::Storage`] if the read fails or the document
    /// does not parse as `T`.
    pub async fn load_value<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.backend.get(key).await? else {
            return Ok(None);
        };
        serde_json::from_str::<Option<T>>(&raw)
            .map_err(|e| MoodlogError::Storage(format!("failed to parse {key}: {e}")))
    }

    /// Stores a single JSON value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the underlying write fails.
    pub async fn save_value<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| MoodlogError::Storage(format!("failed to serialize {key}: {e}")))?;
        let _guard = self.write_lock.lock().await;
        self.backend.set(key, json).await
    }

    /// Overwrites the value under `key` with JSON `null`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying write fails.
    pub async fn clear(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.backend.set(key, "null".to_string()).await
    }

    async fn write_collection<T: Serialize>(&self, key: &str, records: &[T]) -> Result<()> {
        let json = serde_json::to_string(records)
            .map_err(|e| MoodlogError::Storage(format!("failed to serialize {key}: {e}")))?;
        self.backend.set(key, json).await?;
        tracing::debug!(key, count = records.len(), "collection saved");
        Ok(())
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore").finish_non_exhaustive()
    }
}
