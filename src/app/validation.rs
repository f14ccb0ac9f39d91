//! Input rules applied before anything reaches the services.
//!
//! The services themselves accept whatever they are given; these checks are
//! the form-level rules the front end enforces.

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::error::{MoodlogError, Result};

/// Longest accepted entry title, in characters.
pub const MAX_TITLE_CHARS: usize = 100;

/// Longest accepted entry body, in characters.
pub const MAX_BODY_CHARS: usize = 2000;

/// Shortest accepted display name after trimming.
pub const MIN_NAME_CHARS: usize = 2;

/// Shortest accepted secret.
pub const MIN_SECRET_CHARS: usize = 6;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap()
});

/// Checks the email shape: something, `@`, something, `.`, something.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Validates sign-up input and returns the trimmed name and email.
///
/// # Errors
///
/// Returns [`MoodlogError::Validation`] naming the first rule broken.
pub fn validate_registration(name: &str, email: &str, secret: &str) -> Result<(String, String)> {
    let name = name.trim();
    if name.is_empty() {
        return Err(MoodlogError::Validation("name is required".to_string()));
    }
    if name.chars().count() < MIN_NAME_CHARS {
        return Err(MoodlogError::Validation(format!(
            "name must be at least {MIN_NAME_CHARS} characters"
        )));
    }
    let email = validate_credentials(email, secret)?;
    Ok((name.to_string(), email))
}

/// Validates sign-in input and returns the trimmed email.
///
/// # Errors
///
/// Returns [`MoodlogError::Validation`] naming the first rule broken.
pub fn validate_credentials(email: &str, secret: &str) -> Result<String> {
    let email = email.trim();
    if email.is_empty() {
        return Err(MoodlogError::Validation("email is required".to_string()));
    }
    if !is_valid_email(email) {
        return Err(MoodlogError::Validation("enter a valid email address".to_string()));
    }
    if secret.trim().is_empty() {
        return Err(MoodlogError::Validation("password is required".to_string()));
    }
    if secret.chars().count() < MIN_SECRET_CHARS {
        return Err(MoodlogError::Validation(format!(
            "password must be at least {MIN_SECRET_CHARS} characters"
        )));
    }
    Ok(email.to_string())
}

/// A journal entry that passed the form rules, ready to be scored and saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    title: String,
    body: String,
}

impl EntryDraft {
    /// Trims and checks title and body.
    ///
    /// # Errors
    ///
    /// Returns [`MoodlogError::Validation`] if either field is blank or too long.
    ///
    /// # Examples
    ///
    /// ```
    /// use moodlog::app::validation::EntryDraft;
    ///
    /// let draft = EntryDraft::new("  Run ", "felt great").unwrap();
    /// assert_eq!(draft.title(), "Run");
    /// assert!(EntryDraft::new("   ", "body").is_err());
    /// ```
    pub fn new(title: &str, body: &str) -> Result<Self> {
        let title = title.trim();
        let body = body.trim();

        if title.is_empty() {
            return Err(MoodlogError::Validation("enter a title for the entry".to_string()));
        }
        if body.is_empty() {
            return Err(MoodlogError::Validation("write something in the entry".to_string()));
        }
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(MoodlogError::Validation(format!(
                "title is longer than {MAX_TITLE_CHARS} characters"
            )));
        }
        if body.chars().count() > MAX_BODY_CHARS {
            return Err(MoodlogError::Validation(format!(
                "entry is longer than {MAX_BODY_CHARS} characters"
            )));
        }

        Ok(Self {
            title: title.to_string(),
            body: body.to_string(),
        })
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}
