//! Key-value substrate abstraction.
//!
//! This module defines the [`KeyValueStore`] trait: the opaque async
//! `get`/`set` pair everything else persists through. Values are whole JSON
//! documents stored as strings; the substrate never looks inside them.
//!
//! # Design
//!
//! The trait is deliberately smaller than a database API. Typed access,
//! collection handling, and write serialization live one level up in
//! [`crate::storage::RecordStore`].

use async_trait::async_trait;

use crate::domain::error::Result;

/// Abstraction over string-valued key-value storage.
///
/// # Implementations
///
/// - [`crate::storage::JsonFileStore`]: one JSON file per key in a data directory
/// - [`crate::storage::MemoryStore`]: process-local map, for tests and dry runs
///
/// # Examples
///
/// ```
/// use moodlog::storage::{KeyValueStore, MemoryStore};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let store = MemoryStore::new();
/// store.set("journals", "[]".to_string()).await?;
/// assert_eq!(store.get("journals").await?.as_deref(), Some("[]"));
/// # Ok::<(), moodlog::MoodlogError>(())
/// # }).unwrap();
/// ```
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if the key was never set.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying write fails. Implementations must not
    /// leave a partially written value behind.
    async fn set(&self, key: &str, value: String) -> Result<()>;
}
