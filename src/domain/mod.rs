//! Domain layer for moodlog.
//!
//! Core types with no storage or network concerns: accounts, journal entries,
//! mood scores, and the crate error type.
//!
//! # Organization
//!
//! - [`account`]: registered users and the profile kept by the session
//! - [`entry`]: journal entries
//! - [`error`]: error types and result aliases
//! - [`mood`]: mood dimensions and sparse score vectors
//!
//! # Examples
//!
//! ```
//! use moodlog::domain::{JournalEntry, MoodDimension, MoodVector};
//!
//! let mood = MoodVector::default().with(MoodDimension::Happiness, 8);
//! let entry = JournalEntry::new("Run".into(), "felt great".into(), mood, None);
//! assert_eq!(entry.mood.score(MoodDimension::Happiness), 8);
//! ```

pub mod account;
pub mod entry;
pub mod error;
pub mod mood;

pub use account::{Account, AccountProfile};
pub use entry::JournalEntry;
pub use error::{MoodlogError, Result};
pub use mood::{MoodDimension, MoodVector};
