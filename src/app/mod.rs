//! Application layer: services, session, query pipeline, and the [`App`] facade.
//!
//! This module contains the business logic that sits between the storage layer
//! and whatever front end drives it (the CLI in `main.rs`, or tests).
//!
//! # Modules
//!
//! - [`accounts`]: registration and sign-in
//! - [`journal`]: entry create/list/remove and the score-then-save flow
//! - [`query`]: search, mood filter, and sort over entries
//! - [`session`]: the signed-in account, persisted across runs
//! - [`validation`]: form rules for sign-up, sign-in, and entry drafts
//!
//! # Example
//!
//! ```rust
//! use moodlog::app::{App, JournalQuery};
//! use moodlog::domain::MoodVector;
//! use moodlog::scorer::MoodScorer;
//! use moodlog::storage::MemoryStore;
//! use std::sync::Arc;
//!
//! struct Neutral;
//!
//! #[async_trait::async_trait]
//! impl MoodScorer for Neutral {
//!     async fn detect(&self, _: &str, _: &str) -> moodlog::Result<MoodVector> {
//!         Ok(MoodVector::default())
//!     }
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let mut app = App::open(Arc::new(MemoryStore::new()), Arc::new(Neutral)).await?;
//! app.sign_up("Ada", "ada@example.com", "secret1").await?;
//! app.add_entry("Run", "felt great").await?;
//! assert_eq!(app.entries(&JournalQuery::default()).await?.len(), 1);
//! # Ok::<(), moodlog::MoodlogError>(())
//! # }).unwrap();
//! ```

pub mod accounts;
pub mod journal;
pub mod query;
pub mod session;
pub mod validation;

pub use accounts::AccountService;
pub use journal::JournalService;
pub use query::{JournalQuery, SortKey};
pub use session::Session;
pub use validation::EntryDraft;

use std::sync::Arc;

use crate::domain::error::{MoodlogError, Result};
use crate::domain::{AccountProfile, JournalEntry};
use crate::scorer::MoodScorer;
use crate::storage::{KeyValueStore, RecordStore};

/// Wires the services, the scorer, and the session together.
///
/// Form validation runs here, before the services see any input. Operations
/// on entries require a signed-in session.
pub struct App {
    records: Arc<RecordStore>,
    accounts: AccountService,
    journal: JournalService,
    scorer: Arc<dyn MoodScorer>,
    session: Session,
}

impl App {
    /// Builds the app over `backend` and restores the persisted session.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored session cannot be read.
    pub async fn open(backend: Arc<dyn KeyValueStore>, scorer: Arc<dyn MoodScorer>) -> Result<Self> {
        let records = Arc::new(RecordStore::new(backend));
        let session = Session::restore(&records).await?;

        Ok(Self {
            accounts: AccountService::new(Arc::clone(&records)),
            journal: JournalService::new(Arc::clone(&records)),
            records,
            scorer,
            session,
        })
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Validates, registers, and signs in a new account.
    ///
    /// # Errors
    ///
    /// Validation errors, [`MoodlogError::DuplicateAccount`], or storage errors.
    pub async fn sign_up(&mut self, name: &str, email: &str, secret: &str) -> Result<AccountProfile> {
        let (name, email) = validation::validate_registration(name, email, secret)?;
        let account = self.accounts.register(&name, &email, secret).await?;
        self.start_session(account.profile()).await
    }

    /// Validates credentials, authenticates, and signs in.
    ///
    /// # Errors
    ///
    /// Validation errors, [`MoodlogError::NoAccounts`],
    /// [`MoodlogError::InvalidCredentials`], or storage errors.
    pub async fn sign_in(&mut self, email: &str, secret: &str) -> Result<AccountProfile> {
        let email = validation::validate_credentials(email, secret)?;
        let account = self.accounts.authenticate(&email, secret).await?;
        self.start_session(account.profile()).await
    }

    /// Forgets the signed-in account, here and in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleared session cannot be written.
    pub async fn sign_out(&mut self) -> Result<()> {
        self.session.sign_out();
        self.session.persist(&self.records).await
    }

    /// Validates a draft, scores it, and saves it for the signed-in account.
    ///
    /// # Errors
    ///
    /// [`MoodlogError::NotSignedIn`], validation errors,
    /// [`MoodlogError::Scoring`], or storage errors.
    pub async fn add_entry(&self, title: &str, body: &str) -> Result<JournalEntry> {
        self.require_session()?;
        let draft = EntryDraft::new(title, body)?;
        self.journal
            .compose(&self.session, self.scorer.as_ref(), &draft)
            .await
    }

    /// The signed-in account's entries after running `query`.
    ///
    /// # Errors
    ///
    /// [`MoodlogError::NotSignedIn`] or storage errors.
    pub async fn entries(&self, query: &JournalQuery) -> Result<Vec<JournalEntry>> {
        self.require_session()?;
        let entries = self.journal.list(&self.session).await?;
        Ok(query.apply(&entries))
    }

    /// One of the signed-in account's entries.
    ///
    /// # Errors
    ///
    /// [`MoodlogError::NotSignedIn`] or storage errors.
    pub async fn entry(&self, id: &str) -> Result<Option<JournalEntry>> {
        self.require_session()?;
        self.journal.find(&self.session, id).await
    }

    /// Deletes an entry by id. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// [`MoodlogError::NotSignedIn`] or storage errors.
    pub async fn delete_entry(&self, id: &str) -> Result<bool> {
        self.require_session()?;
        self.journal.remove(id).await
    }

    async fn start_session(&mut self, profile: AccountProfile) -> Result<AccountProfile> {
        self.session.sign_in(profile.clone());
        self.session.persist(&self.records).await?;
        Ok(profile)
    }

    fn require_session(&self) -> Result<()> {
        if self.session.account_id().is_none() {
            return Err(MoodlogError::NotSignedIn);
        }
        Ok(())
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
