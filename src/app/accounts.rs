//! Registration and sign-in.
//!
//! The account service owns the unique-email invariant. Secrets are hashed
//! with Argon2id and a random salt before they are stored; sign-in verifies
//! through the Argon2 verifier, which compares in constant time.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use std::sync::Arc;

use crate::domain::error::{MoodlogError, Result};
use crate::domain::Account;
use crate::storage::{RecordStore, ACCOUNTS_KEY};

/// Registers and authenticates accounts against the `users` collection.
#[derive(Debug, Clone)]
pub struct AccountService {
    records: Arc<RecordStore>,
}

impl AccountService {
    pub fn new(records: Arc<RecordStore>) -> Self {
        Self { records }
    }

    /// Creates an account.
    ///
    /// The email check and the append happen under one write lock, so two
    /// registrations racing on the same email cannot both succeed.
    ///
    /// # Errors
    ///
    /// - [`MoodlogError::DuplicateAccount`] if the email is already registered
    ///   (exact, case-sensitive match)
    /// - [`MoodlogError::Credentials`] if hashing fails
    /// - storage errors from loading or saving
    #[tracing::instrument(name = "account_register", level = "debug", skip(self, name, secret))]
    pub async fn register(&self, name: &str, email: &str, secret: &str) -> Result<Account> {
        let secret_hash = hash_secret(secret)?;
        let account = Account::new(name.to_string(), email.to_string(), secret_hash);

        let created = account.clone();
        self.records
            .update(ACCOUNTS_KEY, move |accounts: &mut Vec<Account>| {
                if accounts.iter().any(|a| a.email == account.email) {
                    return Err(MoodlogError::DuplicateAccount(account.email.clone()));
                }
                accounts.push(account);
                Ok(())
            })
            .await?;

        tracing::info!(account_id = %created.id, "account registered");
        Ok(created)
    }

    /// Finds the account matching `email` and `secret`.
    ///
    /// Returns the first account whose email matches exactly and whose stored
    /// secret verifies `secret`. A stored secret that is not an Argon2 PHC
    /// string is a plaintext record from older data: it is checked through
    /// the same verifier and, on a match, replaced by a hash in `users`.
    ///
    /// # Errors
    ///
    /// - [`MoodlogError::NoAccounts`] if no account was ever registered
    /// - [`MoodlogError::InvalidCredentials`] if nothing matches
    /// - [`MoodlogError::Credentials`] or storage errors while upgrading a
    ///   plaintext record
    #[tracing::instrument(name = "account_authenticate", level = "debug", skip(self, secret))]
    pub async fn authenticate(&self, email: &str, secret: &str) -> Result<Account> {
        let accounts: Vec<Account> = self
            .records
            .load_existing(ACCOUNTS_KEY)
            .await?
            .ok_or(MoodlogError::NoAccounts)?;

        for account in accounts.into_iter().filter(|a| a.email == email) {
            let account = match check_secret(secret, &account.secret)? {
                SecretCheck::Verified => account,
                SecretCheck::Upgraded(hash) => self.upgrade_secret(account, hash).await?,
                SecretCheck::Rejected => continue,
            };
            tracing::info!(account_id = %account.id, "account authenticated");
            return Ok(account);
        }

        Err(MoodlogError::InvalidCredentials)
    }

    /// Replaces a plaintext secret with `hash`, unless it changed meanwhile.
    async fn upgrade_secret(&self, mut account: Account, hash: String) -> Result<Account> {
        let id = account.id.clone();
        let plaintext = account.secret.clone();
        let stored_hash = hash.clone();

        self.records
            .update(ACCOUNTS_KEY, move |accounts: &mut Vec<Account>| {
                if let Some(stored) = accounts
                    .iter_mut()
                    .find(|a| a.id == id && a.secret == plaintext)
                {
                    stored.secret = stored_hash;
                }
                Ok(())
            })
            .await?;

        tracing::info!(account_id = %account.id, "plaintext secret upgraded to hash");
        account.secret = hash;
        Ok(account)
    }
}

/// Outcome of checking a supplied secret against a stored one.
enum SecretCheck {
    Verified,
    /// Matched a plaintext record; carries the hash to store instead.
    Upgraded(String),
    Rejected,
}

fn hash_secret(secret: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| MoodlogError::Credentials(e.to_string()))
}

fn verify_secret(secret: &str, hash: &PasswordHash<'_>) -> bool {
    Argon2::default()
        .verify_password(secret.as_bytes(), hash)
        .is_ok()
}

/// Plaintext records are hashed first so the comparison still goes through
/// the Argon2 verifier, which runs in constant time.
fn check_secret(secret: &str, stored: &str) -> Result<SecretCheck> {
    if let Ok(parsed) = PasswordHash::new(stored) {
        return Ok(if verify_secret(secret, &parsed) {
            SecretCheck::Verified
        } else {
            SecretCheck::Rejected
        });
    }

    tracing::warn!("stored secret is not a hash, checking as plaintext");
    let rehashed = hash_secret(stored)?;
    let matched = {
        let parsed =
            PasswordHash::new(&rehashed).map_err(|e| MoodlogError::Credentials(e.to_string()))?;
        verify_secret(secret, &parsed)
    };

    Ok(if matched {
        SecretCheck::Upgraded(rehashed)
    } else {
        SecretCheck::Rejected
    })
}
