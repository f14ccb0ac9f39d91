//! moodlog: a local journaling engine with per-entry mood scoring.
//!
//! moodlog keeps accounts, journal entries, and the signed-in session as JSON
//! documents on disk. New entries are sent to a chat-completions model, which
//! rates the emotions they express, and the entry is stored with that score.
//! Entries can then be searched, filtered by mood, and sorted.

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  CLI (main.rs)                                      │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │
//! │  - App facade, form validation                      │
//! │  - Account and journal services                     │
//! │  - Session, query pipeline                          │
//! └─────────────────────────────────────────────────────┘
//!         │                                     │
//! ┌─────────────────────────┐   ┌─────────────────────────┐
//! │ Storage Layer           │   │ Scorer (scorer/)        │
//! │ (storage/)              │   │ - MoodScorer trait      │
//! │ - KeyValueStore trait   │   │ - OpenAI chat client    │
//! │ - JSON files, memory    │   │                         │
//! │ - Typed records         │   │                         │
//! └─────────────────────────┘   └─────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Infrastructure & Domain Layers                     │
//! │  - Platform paths (infrastructure/)                 │
//! │  - Accounts, entries, moods, errors (domain/)       │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │  ← Optional
//! │  - OpenTelemetry tracing, file-based OTLP export    │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: the [`App`] facade, services, session, and query pipeline
//! - [`domain`]: core types and [`MoodlogError`]
//! - [`infrastructure`]: data directory and `~` expansion
//! - [`scorer`]: mood scoring
//! - [`storage`]: key-value substrate and typed record collections
//! - [`observability`]: tracing setup
//!
//! # Configuration
//!
//! An optional `config.toml` in the data directory:
//!
//! ```toml
//! data_dir = "~/journal"
//! trace_level = "debug"
//!
//! [scorer]
//! endpoint = "https://api.openai.com/v1/chat/completions"
//! model = "gpt-4"
//! temperature = 0.4
//! api_key = "sk-..."
//! ```
//!
//! `MOODLOG_DATA_DIR`, `MOODLOG_API_KEY` (or `OPENAI_API_KEY`), and
//! `MOODLOG_TRACE_LEVEL` override the file.
//!
//! # Key Design Decisions
//!
//! ## Whole-collection documents
//!
//! Each collection is one JSON array under one key. Every mutation loads the
//! array, changes it, and writes it back while holding the store's write
//! lock, so concurrent saves within a process never lose each other's work.
//!
//! ## Score, then save
//!
//! An entry is only written once the scorer has answered. A failed scoring
//! call leaves storage untouched and is reported to the caller; nothing is
//! retried.
//!
//! ## Hashed secrets
//!
//! Passwords are stored as Argon2 PHC strings. Records from older data that
//! hold a plaintext secret still sign in, and are rehashed on that sign-in.

pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod observability;
pub mod scorer;
pub mod storage;

pub use app::{App, JournalQuery, Session, SortKey};
pub use domain::{AccountProfile, JournalEntry, MoodDimension, MoodVector, MoodlogError, Result};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::infrastructure::{default_data_dir, expand_tilde};
use crate::scorer::OpenAiScorer;
use crate::storage::JsonFileStore;

/// Environment variable overriding [`Config::data_dir`].
pub const ENV_DATA_DIR: &str = "MOODLOG_DATA_DIR";
/// Environment variable overriding [`ScorerConfig::api_key`].
pub const ENV_API_KEY: &str = "MOODLOG_API_KEY";
/// Fallback for [`ENV_API_KEY`].
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable overriding [`Config::trace_level`].
pub const ENV_TRACE_LEVEL: &str = "MOODLOG_TRACE_LEVEL";

/// Runtime configuration, read from TOML and the environment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where the JSON documents and trace file live.
    ///
    /// A leading `~` expands to the home directory. Default: the platform's
    /// local data directory.
    pub data_dir: Option<PathBuf>,

    /// Tracing level: `trace`, `debug`, `info`, `warn`, or `error`.
    /// Default: `"info"`
    pub trace_level: Option<String>,

    pub scorer: ScorerConfig,
}

/// Settings for the chat-completions mood scorer.
#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScorerConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,

    /// Bearer token. Without one, requests carry no `Authorization` header.
    pub api_key: Option<String>,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4".to_string(),
            temperature: 0.4,
            api_key: None,
        }
    }
}

impl std::fmt::Debug for ScorerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScorerConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Config {
    /// Parses a TOML document. Absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`MoodlogError::Config`] for malformed TOML or unknown keys.
    ///
    /// # Example
    ///
    /// ```rust
    /// use moodlog::Config;
    ///
    /// let config = Config::from_toml_str("[scorer]\nmodel = \"gpt-4o\"\n")?;
    /// assert_eq!(config.scorer.model, "gpt-4o");
    /// assert!((config.scorer.temperature - 0.4).abs() < f32::EPSILON);
    /// # Ok::<(), moodlog::MoodlogError>(())
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| MoodlogError::Config(e.to_string()))
    }

    /// Reads `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`MoodlogError::Config`] if the file is malformed, or
    /// [`MoodlogError::Io`] if it exists but cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text).map_err(|e| match e {
                MoodlogError::Config(msg) => {
                    MoodlogError::Config(format!("{}: {msg}", path.display()))
                }
                other => other,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Applies overrides from a variable map, as produced by the environment.
    ///
    /// Recognizes [`ENV_DATA_DIR`], [`ENV_API_KEY`], [`ENV_OPENAI_API_KEY`],
    /// and [`ENV_TRACE_LEVEL`]. Empty values are ignored.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use moodlog::Config;
    ///
    /// let mut vars = BTreeMap::new();
    /// vars.insert("OPENAI_API_KEY".to_string(), "sk-test".to_string());
    ///
    /// let config = Config::default().with_overrides(&vars);
    /// assert_eq!(config.scorer.api_key.as_deref(), Some("sk-test"));
    /// ```
    #[must_use]
    pub fn with_overrides(mut self, vars: &BTreeMap<String, String>) -> Self {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        if let Some(dir) = get(ENV_DATA_DIR) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(key) = get(ENV_API_KEY).or_else(|| get(ENV_OPENAI_API_KEY)) {
            self.scorer.api_key = Some(key.to_string());
        }
        if let Some(level) = get(ENV_TRACE_LEVEL) {
            self.trace_level = Some(level.to_string());
        }
        self
    }

    /// [`Config::with_overrides`] over the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        let vars: BTreeMap<String, String> = [ENV_DATA_DIR, ENV_API_KEY, ENV_OPENAI_API_KEY, ENV_TRACE_LEVEL]
            .into_iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)))
            .collect();
        self.with_overrides(&vars)
    }

    /// The resolved data directory.
    ///
    /// # Errors
    ///
    /// Returns [`MoodlogError::Config`] if no directory is configured and the
    /// platform default cannot be determined.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(expand_tilde(&dir.to_string_lossy())),
            None => default_data_dir(),
        }
    }
}

/// Opens file-backed storage and the configured scorer, and restores the
/// previous session.
///
/// Tracing is installed separately; see [`observability::init_tracing`].
///
/// # Errors
///
/// Returns an error if the data directory cannot be resolved or created, or
/// if the stored session is unreadable.
///
/// # Example
///
/// ```rust
/// use moodlog::{initialize, Config};
///
/// let dir = tempfile::tempdir().unwrap();
/// let config = Config {
///     data_dir: Some(dir.path().to_path_buf()),
///     ..Default::default()
/// };
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let app = initialize(&config).await?;
/// assert!(app.session().account().is_none());
/// # Ok::<(), moodlog::MoodlogError>(())
/// # }).unwrap();
/// ```
pub async fn initialize(config: &Config) -> Result<App> {
    let store = JsonFileStore::open(config.data_dir()?)?;
    tracing::debug!(data_dir = %store.root().display(), "initializing moodlog");

    let scorer = OpenAiScorer::new(&config.scorer);
    App::open(Arc::new(store), Arc::new(scorer)).await
}
