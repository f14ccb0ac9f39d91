//! Search, mood filter, and sort over a user's journal entries.
//!
//! [`JournalQuery::apply`] is a pure function of its inputs. It copies the
//! entries it keeps and never touches the caller's slice.
//!
//! # Pipeline
//!
//! 1. **Search**: case-insensitive substring match on title OR content.
//!    An empty search keeps everything.
//! 2. **Mood filter**: when a dimension is selected, keep entries scoring at
//!    least `threshold` on it. A missing dimension scores zero. No dimension
//!    selected means no filtering, whatever the threshold.
//! 3. **Sort**: descending by date, or descending by one dimension's score.
//!    The sort is stable, so ties keep their input order.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::MoodlogError;
use crate::domain::{JournalEntry, MoodDimension};

/// Threshold used when a mood filter is picked without an explicit minimum.
pub const DEFAULT_THRESHOLD: i32 = 5;

/// Ordering applied as the last pipeline step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Most recent first.
    #[default]
    Recency,
    /// Highest score on the dimension first.
    Mood(MoodDimension),
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recency => f.write_str("date"),
            Self::Mood(dimension) => write!(f, "{dimension}"),
        }
    }
}

impl FromStr for SortKey {
    type Err = MoodlogError;

    /// Accepts `date` or any mood dimension name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("date") {
            return Ok(Self::Recency);
        }
        s.parse::<MoodDimension>()
            .map(Self::Mood)
            .map_err(|_| MoodlogError::Validation(format!("unknown sort key: {s}")))
    }
}

/// Filter and sort parameters for the entry list.
///
/// # Example
///
/// ```rust
/// use moodlog::app::query::{JournalQuery, SortKey};
/// use moodlog::domain::MoodDimension;
///
/// let query = JournalQuery::default()
///     .search("run")
///     .mood_at_least(MoodDimension::Happiness, 5)
///     .sort_by(SortKey::Recency);
/// assert!(query.apply(&[]).is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalQuery {
    /// Free text matched against title and content.
    pub search: String,
    /// Dimension to threshold on, `None` for no mood filter.
    pub mood_filter: Option<MoodDimension>,
    /// Minimum score on `mood_filter`, inclusive.
    pub threshold: i32,
    pub sort: SortKey,
}

impl Default for JournalQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            mood_filter: None,
            threshold: DEFAULT_THRESHOLD,
            sort: SortKey::Recency,
        }
    }
}

impl JournalQuery {
    #[must_use]
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = text.into();
        self
    }

    #[must_use]
    pub fn mood_at_least(mut self, dimension: MoodDimension, threshold: i32) -> Self {
        self.mood_filter = Some(dimension);
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub fn sort_by(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// Runs search, mood filter, and sort over `entries`, returning a new list.
    #[must_use]
    pub fn apply(&self, entries: &[JournalEntry]) -> Vec<JournalEntry> {
        let _span = tracing::debug_span!("journal_query",
            total_entries = entries.len(),
            search_len = self.search.len(),
            mood_filter = ?self.mood_filter,
            sort = %self.sort
        )
        .entered();

        let needle = self.search.to_lowercase();

        let mut results: Vec<JournalEntry> = entries
            .iter()
            .filter(|entry| needle.is_empty() || matches_search(entry, &needle))
            .filter(|entry| {
                self.mood_filter
                    .map_or(true, |dimension| entry.mood.score(dimension) >= self.threshold)
            })
            .cloned()
            .collect();

        match self.sort {
            SortKey::Recency => results.sort_by(|a, b| b.date.cmp(&a.date)),
            SortKey::Mood(dimension) => {
                results.sort_by(|a, b| b.mood.score(dimension).cmp(&a.mood.score(dimension)));
            }
        }

        tracing::debug!(result_count = results.len(), "query applied");
        results
    }
}

fn matches_search(entry: &JournalEntry, needle: &str) -> bool {
    entry.title.to_lowercase().contains(needle) || entry.content.to_lowercase().contains(needle)
}
