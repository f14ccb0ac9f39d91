//! Mood scoring.
//!
//! A [`MoodScorer`] turns an entry's title and body into a sparse
//! [`MoodVector`]. Scoring is a remote call with no retry: one failure
//! surfaces immediately as [`crate::MoodlogError::Scoring`].
//!
//! # Modules
//!
//! - `openai`: chat-completions client that prompts a model for scores

pub mod openai;

use async_trait::async_trait;

use crate::domain::error::Result;
use crate::domain::MoodVector;

pub use openai::OpenAiScorer;

/// Maps entry text to mood scores.
///
/// Implementations return only the dimensions they judge relevant; anything
/// not returned reads as zero.
#[async_trait]
pub trait MoodScorer: Send + Sync {
    /// Scores one entry.
    ///
    /// # Errors
    ///
    /// Returns [`crate::MoodlogError::Scoring`] if the call fails or the
    /// response is not a mood object.
    async fn detect(&self, title: &str, body: &str) -> Result<MoodVector>;
}
