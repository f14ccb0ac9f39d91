//! Account domain model.
//!
//! An [`Account`] is created once at registration and never mutated. Its `secret`
//! field holds an Argon2 PHC hash string, never the plaintext the user typed.
//! The non-secret part, [`AccountProfile`], is what the session keeps.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A registered user as stored in the `users` collection.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string (`$argon2id$v=19$...`).
    pub secret: String,
}

impl Account {
    /// Creates an account with a fresh UUID v4 identifier.
    ///
    /// `secret_hash` must already be hashed; see
    /// [`crate::app::accounts::AccountService::register`].
    #[must_use]
    pub fn new(name: String, email: String, secret_hash: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            email,
            secret: secret_hash,
        }
    }

    /// The non-secret view of this account.
    #[must_use]
    pub fn profile(&self) -> AccountProfile {
        AccountProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Identity of the signed-in account, without credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub id: String,
    pub name: String,
    pub email: String,
}
