use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moodlog::scorer::MoodScorer;
use moodlog::storage::{JsonFileStore, KeyValueStore, MemoryStore, JOURNALS_KEY};
use moodlog::{App, JournalQuery, MoodDimension, MoodVector, MoodlogError, SortKey};
use tempfile::TempDir;

/// Scores "happy" words high on happiness and everything else on sadness.
struct KeywordScorer {
    calls: AtomicUsize,
}

impl KeywordScorer {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl MoodScorer for KeywordScorer {
    async fn detect(&self, title: &str, body: &str) -> moodlog::Result<MoodVector> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Keeps consecutive entries on distinct millisecond timestamps.
        tokio::time::sleep(Duration::from_millis(5)).await;
        let text = format!("{title} {body}").to_lowercase();
        if text.contains("great") || text.contains("sunny") {
            Ok(MoodVector::default().with(MoodDimension::Happiness, 8))
        } else {
            Ok(MoodVector::default().with(MoodDimension::Sadness, 6))
        }
    }
}

struct OfflineScorer;

#[async_trait]
impl MoodScorer for OfflineScorer {
    async fn detect(&self, _title: &str, _body: &str) -> moodlog::Result<MoodVector> {
        Err(MoodlogError::Scoring("connection refused".to_string()))
    }
}

async fn memory_app(scorer: Arc<dyn MoodScorer>) -> (Arc<MemoryStore>, App) {
    let backend = Arc::new(MemoryStore::new());
    let app = App::open(backend.clone(), scorer).await.unwrap();
    (backend, app)
}

#[tokio::test]
async fn register_write_search_and_sort() {
    let (_, mut app) = memory_app(KeywordScorer::new()).await;
    app.sign_up("Ada", "ada@example.com", "secret1").await.unwrap();

    let run = app.add_entry("Morning run", "felt great").await.unwrap();
    let rain = app.add_entry("Rain", "stayed inside all day").await.unwrap();
    assert_eq!(run.mood.score(MoodDimension::Happiness), 8);
    assert_eq!(rain.mood.score(MoodDimension::Happiness), 0);

    assert!(rain.date > run.date);
    let newest_first = app.entries(&JournalQuery::default()).await.unwrap();
    assert_eq!(newest_first, vec![rain.clone(), run.clone()]);

    let searched = app
        .entries(&JournalQuery::default().search("RUN"))
        .await
        .unwrap();
    assert_eq!(searched, vec![run.clone()]);

    let happy = app
        .entries(&JournalQuery::default().mood_at_least(MoodDimension::Happiness, 5))
        .await
        .unwrap();
    assert_eq!(happy, vec![run.clone()]);

    let by_sadness = app
        .entries(&JournalQuery::default().sort_by(SortKey::Mood(MoodDimension::Sadness)))
        .await
        .unwrap();
    assert_eq!(by_sadness[0].id, rain.id);
}

#[tokio::test]
async fn accounts_only_see_their_own_entries() {
    let (backend, mut app) = memory_app(KeywordScorer::new()).await;

    app.sign_up("Ada", "ada@example.com", "secret1").await.unwrap();
    let ada_entry = app.add_entry("Sunny", "a sunny walk").await.unwrap();
    app.sign_out().await.unwrap();

    app.sign_up("Bob", "bob@example.com", "secret2").await.unwrap();
    assert!(app.entries(&JournalQuery::default()).await.unwrap().is_empty());
    assert!(app.entry(&ada_entry.id).await.unwrap().is_none());
    app.add_entry("Bob's day", "ok").await.unwrap();
    app.sign_out().await.unwrap();

    app.sign_in("ada@example.com", "secret1").await.unwrap();
    let mine = app.entries(&JournalQuery::default()).await.unwrap();
    assert_eq!(mine, vec![ada_entry]);

    let stored = backend.get(JOURNALS_KEY).await.unwrap().unwrap();
    let raw: serde_json::Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(raw.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn entry_operations_require_sign_in() {
    let scorer = KeywordScorer::new();
    let (_, app) = memory_app(scorer.clone()).await;

    assert!(matches!(
        app.add_entry("Run", "felt great").await,
        Err(MoodlogError::NotSignedIn)
    ));
    assert!(matches!(
        app.entries(&JournalQuery::default()).await,
        Err(MoodlogError::NotSignedIn)
    ));
    assert!(matches!(
        app.delete_entry("x").await,
        Err(MoodlogError::NotSignedIn)
    ));
    assert_eq!(scorer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn sign_in_failures() {
    let (_, mut app) = memory_app(KeywordScorer::new()).await;

    assert!(matches!(
        app.sign_in("ada@example.com", "secret1").await,
        Err(MoodlogError::NoAccounts)
    ));

    app.sign_up("Ada", "ada@example.com", "secret1").await.unwrap();
    app.sign_out().await.unwrap();

    assert!(matches!(
        app.sign_in("ada@example.com", "wrong-secret").await,
        Err(MoodlogError::InvalidCredentials)
    ));
    assert!(matches!(
        app.sign_up("Ada Again", "ada@example.com", "secret9").await,
        Err(MoodlogError::DuplicateAccount(_))
    ));
    assert!(matches!(
        app.sign_in("not-an-email", "secret1").await,
        Err(MoodlogError::Validation(_))
    ));
    assert!(app.session().account().is_none());
}

#[tokio::test]
async fn invalid_drafts_are_not_scored() {
    let scorer = KeywordScorer::new();
    let (backend, mut app) = memory_app(scorer.clone()).await;
    app.sign_up("Ada", "ada@example.com", "secret1").await.unwrap();

    assert!(matches!(
        app.add_entry("   ", "body").await,
        Err(MoodlogError::Validation(_))
    ));
    assert!(matches!(
        app.add_entry(&"t".repeat(101), "body").await,
        Err(MoodlogError::Validation(_))
    ));
    assert_eq!(scorer.calls.load(Ordering::SeqCst), 0);
    assert_eq!(backend.get(JOURNALS_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn scoring_failure_leaves_storage_untouched() {
    let (backend, mut app) = memory_app(Arc::new(OfflineScorer)).await;
    app.sign_up("Ada", "ada@example.com", "secret1").await.unwrap();

    let err = app.add_entry("Run", "felt great").await.unwrap_err();
    assert!(matches!(err, MoodlogError::Scoring(_)));
    assert_eq!(backend.get(JOURNALS_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn remove_then_list() {
    let (_, mut app) = memory_app(KeywordScorer::new()).await;
    app.sign_up("Ada", "ada@example.com", "secret1").await.unwrap();
    let first = app.add_entry("One", "great").await.unwrap();
    let second = app.add_entry("Two", "meh").await.unwrap();

    assert!(app.delete_entry(&first.id).await.unwrap());
    assert!(!app.delete_entry(&first.id).await.unwrap());

    let left = app.entries(&JournalQuery::default()).await.unwrap();
    assert_eq!(left, vec![second]);
}

#[tokio::test]
async fn session_and_entries_survive_restart_on_disk() {
    let dir = TempDir::new().unwrap();
    let backend: Arc<dyn KeyValueStore> =
        Arc::new(JsonFileStore::open(dir.path().to_path_buf()).unwrap());

    let saved = {
        let mut app = App::open(backend.clone(), KeywordScorer::new()).await.unwrap();
        app.sign_up("Ada", "ada@example.com", "secret1").await.unwrap();
        app.add_entry("Sunny", "a sunny walk").await.unwrap()
    };

    let reopened_backend: Arc<dyn KeyValueStore> =
        Arc::new(JsonFileStore::open(dir.path().to_path_buf()).unwrap());
    let mut app = App::open(reopened_backend, KeywordScorer::new()).await.unwrap();

    let profile = app.session().account().cloned().unwrap();
    assert_eq!(profile.email, "ada@example.com");
    assert_eq!(app.entries(&JournalQuery::default()).await.unwrap(), vec![saved]);

    let users = std::fs::read_to_string(dir.path().join("users.json")).unwrap();
    assert!(!users.contains("secret1"));

    app.sign_out().await.unwrap();
    let restarted = App::open(
        Arc::new(JsonFileStore::open(dir.path().to_path_buf()).unwrap()),
        KeywordScorer::new(),
    )
    .await
    .unwrap();
    assert!(restarted.session().account().is_none());
}
