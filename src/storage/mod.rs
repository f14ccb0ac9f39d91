//! Storage layer for accounts, journal entries, and the session.
//!
//! Everything is persisted as JSON documents under fixed keys in an opaque
//! key-value substrate. The substrate is a trait so the same services run over
//! files on disk or an in-memory map.
//!
//! # Modules
//!
//! - `backend`: the [`KeyValueStore`] trait
//! - `json`: file-per-key substrate with atomic writes
//! - `memory`: in-process substrate
//! - `records`: typed collections with serialized read-modify-write

pub mod backend;
pub mod json;
pub mod memory;
pub mod records;

pub use backend::KeyValueStore;
pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use records::{RecordStore, ACCOUNTS_KEY, JOURNALS_KEY, SESSION_KEY};
