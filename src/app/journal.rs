//! Journal entry persistence scoped to the signed-in account.
//!
//! The service does not validate titles or bodies; see
//! [`crate::app::validation::EntryDraft`] for the form rules.

use std::sync::Arc;

use crate::app::session::Session;
use crate::app::validation::EntryDraft;
use crate::domain::error::Result;
use crate::domain::{JournalEntry, MoodVector};
use crate::scorer::MoodScorer;
use crate::storage::{RecordStore, JOURNALS_KEY};

/// Creates, lists, and deletes entries in the `journals` collection.
#[derive(Debug, Clone)]
pub struct JournalService {
    records: Arc<RecordStore>,
}

impl JournalService {
    pub fn new(records: Arc<RecordStore>) -> Self {
        Self { records }
    }

    /// Appends a new entry owned by the session's account (or by nobody).
    ///
    /// The id and timestamp are assigned here.
    ///
    /// # Errors
    ///
    /// Returns storage errors from loading or saving the collection.
    #[tracing::instrument(name = "journal_save", level = "debug", skip_all)]
    pub async fn save(
        &self,
        session: &Session,
        title: &str,
        body: &str,
        mood: MoodVector,
    ) -> Result<JournalEntry> {
        let entry = JournalEntry::new(
            title.to_string(),
            body.to_string(),
            mood,
            session.account_id().map(str::to_string),
        );

        let saved = entry.clone();
        self.records
            .update(JOURNALS_KEY, move |entries: &mut Vec<JournalEntry>| {
                entries.push(entry);
                Ok(())
            })
            .await?;

        tracing::info!(entry_id = %saved.id, owned = saved.user_id.is_some(), "journal entry saved");
        Ok(saved)
    }

    /// Entries owned by the session's account, in stored order.
    ///
    /// An anonymous session sees nothing, including unowned entries.
    ///
    /// # Errors
    ///
    /// Returns storage errors from loading the collection.
    #[tracing::instrument(name = "journal_list", level = "debug", skip_all)]
    pub async fn list(&self, session: &Session) -> Result<Vec<JournalEntry>> {
        let Some(account_id) = session.account_id() else {
            tracing::debug!("anonymous session, no entries visible");
            return Ok(Vec::new());
        };

        let entries: Vec<JournalEntry> = self.records.load(JOURNALS_KEY).await?;
        let total = entries.len();
        let owned: Vec<JournalEntry> = entries
            .into_iter()
            .filter(|entry| entry.is_owned_by(account_id))
            .collect();

        tracing::debug!(total, visible = owned.len(), "entries listed");
        Ok(owned)
    }

    /// One entry visible to the session, looked up by id.
    ///
    /// # Errors
    ///
    /// Returns storage errors from loading the collection.
    pub async fn find(&self, session: &Session, id: &str) -> Result<Option<JournalEntry>> {
        Ok(self
            .list(session)
            .await?
            .into_iter()
            .find(|entry| entry.id == id))
    }

    /// Removes the first entry with `id`.
    ///
    /// Succeeds whether or not anything matched; the returned flag says
    /// whether an entry was removed. A miss leaves the collection's content and
    /// order unchanged.
    ///
    /// # Errors
    ///
    /// Returns storage errors from loading or saving the collection.
    #[tracing::instrument(name = "journal_remove", level = "debug", skip(self))]
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let removed = self
            .records
            .update(JOURNALS_KEY, |entries: &mut Vec<JournalEntry>| {
                Ok(entries
                    .iter()
                    .position(|entry| entry.id == id)
                    .map(|index| entries.remove(index))
                    .is_some())
            })
            .await?;

        tracing::debug!(removed, "journal remove finished");
        Ok(removed)
    }

    /// Scores a draft and saves it with the resulting mood.
    ///
    /// Scoring happens first. If it fails nothing is written; if saving fails
    /// afterwards the score is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`crate::MoodlogError::Scoring`] from the scorer or storage
    /// errors from saving.
    #[tracing::instrument(name = "journal_compose", level = "debug", skip_all)]
    pub async fn compose(
        &self,
        session: &Session,
        scorer: &dyn MoodScorer,
        draft: &EntryDraft,
    ) -> Result<JournalEntry> {
        let mood = scorer.detect(draft.title(), draft.body()).await?;
        self.save(session, draft.title(), draft.body(), mood).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountProfile, MoodDimension, MoodlogError};
    use crate::storage::{KeyValueStore, MemoryStore};
    use async_trait::async_trait;
    use chrono::{SubsecRound, Utc};

    struct FixedScorer(MoodVector);

    #[async_trait]
    impl MoodScorer for FixedScorer {
        async fn detect(&self, _title: &str, _body: &str) -> Result<MoodVector> {
            Ok(self.0)
        }
    }

    struct FailingScorer;

    #[async_trait]
    impl MoodScorer for FailingScorer {
        async fn detect(&self, _title: &str, _body: &str) -> Result<MoodVector> {
            Err(MoodlogError::Scoring("offline".to_string()))
        }
    }

    fn session(id: &str) -> Session {
        Session::signed_in(AccountProfile {
            id: id.into(),
            name: id.into(),
            email: format!("{id}@example.com"),
        })
    }

    fn service() -> (Arc<MemoryStore>, JournalService) {
        let backend = Arc::new(MemoryStore::new());
        let records = Arc::new(RecordStore::new(backend.clone()));
        (backend, JournalService::new(records))
    }

    #[tokio::test]
    async fn saved_entry_is_listed_with_id_and_timestamp() {
        let (_, journal) = service();
        let ada = session("ada");
        let started = Utc::now().trunc_subsecs(3);

        let saved = journal
            .save(&ada, "Run", "felt great", MoodVector::default())
            .await
            .unwrap();

        let listed = journal.list(&ada).await.unwrap();
        assert_eq!(listed, vec![saved.clone()]);
        assert!(!saved.id.is_empty());
        assert!(saved.date >= started);
        assert_eq!(saved.user_id.as_deref(), Some("ada"));
    }

    #[tokio::test]
    async fn list_is_scoped_to_session_account() {
        let (_, journal) = service();
        let ada = session("ada");
        let bob = session("bob");

        journal.save(&ada, "mine", "a", MoodVector::default()).await.unwrap();
        journal.save(&bob, "theirs", "b", MoodVector::default()).await.unwrap();
        journal
            .save(&Session::anonymous(), "nobody's", "c", MoodVector::default())
            .await
            .unwrap();

        let titles: Vec<String> = journal
            .list(&ada)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, ["mine"]);
        assert!(journal.list(&Session::anonymous()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_missing_id_succeeds_and_changes_nothing() {
        let (backend, journal) = service();
        let ada = session("ada");
        journal.save(&ada, "one", "1", MoodVector::default()).await.unwrap();
        journal.save(&ada, "two", "2", MoodVector::default()).await.unwrap();
        let before = backend.get(JOURNALS_KEY).await.unwrap();

        assert!(!journal.remove("no-such-id").await.unwrap());
        assert_eq!(backend.get(JOURNALS_KEY).await.unwrap(), before);
    }

    #[tokio::test]
    async fn remove_deletes_only_the_matching_entry() {
        let (_, journal) = service();
        let ada = session("ada");
        let first = journal.save(&ada, "one", "1", MoodVector::default()).await.unwrap();
        let second = journal.save(&ada, "two", "2", MoodVector::default()).await.unwrap();

        assert!(journal.remove(&first.id).await.unwrap());
        assert_eq!(journal.list(&ada).await.unwrap(), vec![second.clone()]);
        assert!(journal.find(&ada, &first.id).await.unwrap().is_none());
        assert_eq!(journal.find(&ada, &second.id).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn compose_saves_scored_entry() {
        let (_, journal) = service();
        let ada = session("ada");
        let scorer = FixedScorer(MoodVector::default().with(MoodDimension::Happiness, 9));
        let draft = EntryDraft::new(" Run ", "felt great").unwrap();

        let entry = journal.compose(&ada, &scorer, &draft).await.unwrap();
        assert_eq!(entry.title, "Run");
        assert_eq!(entry.mood.score(MoodDimension::Happiness), 9);
    }

    #[tokio::test]
    async fn failed_scoring_saves_nothing() {
        let (backend, journal) = service();
        let draft = EntryDraft::new("Run", "felt great").unwrap();

        let err = journal
            .compose(&session("ada"), &FailingScorer, &draft)
            .await
            .unwrap_err();

        assert!(matches!(err, MoodlogError::Scoring(_)));
        assert_eq!(backend.get(JOURNALS_KEY).await.unwrap(), None);
    }
}
