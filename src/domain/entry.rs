//! Journal entry domain model.
//!
//! Entries are append-only: created by the journal service with an id and a
//! timestamp, read back through owner-scoped listing, and destroyed by id. They
//! are never edited in place.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::mood::MoodVector;

/// Number of seconds in one minute.
const SECONDS_PER_MINUTE: i64 = 60;

/// Number of seconds in one hour.
const SECONDS_PER_HOUR: i64 = 3600;

/// Number of seconds in one day.
const SECONDS_PER_DAY: i64 = 86400;

/// A journal entry as stored in the `journals` collection.
///
/// # Fields
///
/// - `id`: UUID v4 string assigned at save time
/// - `title`, `content`: entry text (length rules live in [`crate::app::validation`])
/// - `date`: creation instant, UTC with millisecond precision
/// - `mood`: sparse mood scores from the scorer
/// - `user_id`: owning account, `None` for entries saved without a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub title: String,
    pub content: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub mood: MoodVector,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl JournalEntry {
    /// Creates an entry stamped with the current time.
    #[must_use]
    pub fn new(title: String, content: String, mood: MoodVector, user_id: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            content,
            date: Utc::now().trunc_subsecs(3),
            mood,
            user_id,
        }
    }

    /// Whether `account_id` owns this entry.
    #[must_use]
    pub fn is_owned_by(&self, account_id: &str) -> bool {
        self.user_id.as_deref() == Some(account_id)
    }

    /// Human-readable age of the entry relative to `now`.
    ///
    /// - under a minute: "just now"
    /// - under an hour: "Xm ago"
    /// - under a day: "Xh ago"
    /// - otherwise: "Xd ago"
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> String {
        let diff = (now - self.date).num_seconds();

        if diff < SECONDS_PER_MINUTE {
            "just now".to_string()
        } else if diff < SECONDS_PER_HOUR {
            format!("{}m ago", diff / SECONDS_PER_MINUTE)
        } else if diff < SECONDS_PER_DAY {
            format!("{}h ago", diff / SECONDS_PER_HOUR)
        } else {
            format!("{}d ago", diff / SECONDS_PER_DAY)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MoodDimension;
    use chrono::Duration;

    #[test]
    fn serializes_with_camel_case_owner_field() {
        let entry = JournalEntry {
            id: "e1".into(),
            title: "Run".into(),
            content: "felt great".into(),
            date: "2024-05-01T10:00:00.000Z".parse().unwrap(),
            mood: MoodVector::default().with(MoodDimension::Happiness, 8),
            user_id: Some("u1".into()),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["mood"]["happiness"], 8);
        assert!(value["date"].as_str().unwrap().starts_with("2024-05-01T10:00:00"));
    }

    #[test]
    fn unowned_entries_omit_user_id() {
        let entry = JournalEntry::new("t".into(), "c".into(), MoodVector::default(), None);
        let value = serde_json::to_value(&entry).unwrap();
        assert!(value.get("userId").is_none());
        assert!(!entry.is_owned_by(""));
    }

    #[test]
    fn parses_entries_without_mood_or_owner() {
        let json = r#"{"id":"x","title":"t","content":"c","date":"2024-01-01T00:00:00Z"}"#;
        let entry: JournalEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.mood, MoodVector::default());
        assert_eq!(entry.user_id, None);
    }

    #[test]
    fn age_buckets() {
        let entry = JournalEntry::new("t".into(), "c".into(), MoodVector::default(), None);
        assert_eq!(entry.age(entry.date), "just now");
        assert_eq!(entry.age(entry.date + Duration::minutes(5)), "5m ago");
        assert_eq!(entry.age(entry.date + Duration::hours(3)), "3h ago");
        assert_eq!(entry.age(entry.date + Duration::days(7)), "7d ago");
    }
}
