//! Error types for moodlog.
//!
//! This module defines the centralized error type [`MoodlogError`] and a type alias
//! [`Result`] used throughout the crate. Service-layer failures propagate unchanged
//! to the caller; only the command-line front end turns them into messages.

use thiserror::Error;

/// The main error type for moodlog operations.
///
/// Account and session failures carry no payload beyond what the caller already
/// supplied. Scoring and storage failures carry a description of the underlying
/// cause because the caller has no other way to learn it.
///
/// # Examples
///
/// ```
/// use moodlog::MoodlogError;
///
/// fn check(taken: bool, email: &str) -> Result<(), MoodlogError> {
///     if taken {
///         return Err(MoodlogError::DuplicateAccount(email.to_string()));
///     }
///     Ok(())
/// }
///
/// assert!(check(true, "a@b.co").is_err());
/// ```
#[derive(Debug, Error)]
pub enum MoodlogError {
    /// Registration used an email that already belongs to an account.
    #[error("An account with email {0} already exists")]
    DuplicateAccount(String),

    /// Sign-in was attempted before any account was ever registered.
    #[error("No accounts found")]
    NoAccounts,

    /// No stored account matches the supplied email and secret.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The operation needs a signed-in account.
    #[error("Not signed in")]
    NotSignedIn,

    /// Mood detection failed or returned content that is not a mood object.
    #[error("Mood scoring error: {0}")]
    Scoring(String),

    /// Reading or writing the key-value substrate failed, or stored JSON is invalid.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    ///
    /// Converts from `std::io::Error` via `#[from]`.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// User input broke one of the form rules (name length, email shape, etc).
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Hashing a secret failed.
    #[error("Credential error: {0}")]
    Credentials(String),

    /// Configuration is invalid or unreadable.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A specialized `Result` type for moodlog operations.
pub type Result<T> = std::result::Result<T, MoodlogError>;
