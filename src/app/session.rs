//! Signed-in account state.
//!
//! A [`Session`] is an explicit value handed to the journal service rather
//! than process-wide state. It persists under [`SESSION_KEY`] so a restart
//! picks up where the last run left off.

use serde::{Deserialize, Serialize};

use crate::domain::error::Result;
use crate::domain::AccountProfile;
use crate::storage::{RecordStore, SESSION_KEY};

/// The currently authenticated account, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    account: Option<AccountProfile>,
}

impl Session {
    /// A session with nobody signed in.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session signed in as `account`.
    #[must_use]
    pub fn signed_in(account: AccountProfile) -> Self {
        Self {
            account: Some(account),
        }
    }

    /// Profile of the signed-in account.
    #[must_use]
    pub fn account(&self) -> Option<&AccountProfile> {
        self.account.as_ref()
    }

    /// Identifier used to scope journal queries.
    #[must_use]
    pub fn account_id(&self) -> Option<&str> {
        self.account.as_ref().map(|a| a.id.as_str())
    }

    pub fn sign_in(&mut self, account: AccountProfile) {
        tracing::debug!(account_id = %account.id, "session signed in");
        self.account = Some(account);
    }

    pub fn sign_out(&mut self) {
        tracing::debug!("session signed out");
        self.account = None;
    }

    /// Loads the persisted session. Nothing stored means anonymous.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored session cannot be read or parsed.
    pub async fn restore(records: &RecordStore) -> Result<Self> {
        let session = records
            .load_value::<Self>(SESSION_KEY)
            .await?
            .unwrap_or_default();
        tracing::debug!(signed_in = session.account.is_some(), "session restored");
        Ok(session)
    }

    /// Writes this session so the next [`Session::restore`] returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn persist(&self, records: &RecordStore) -> Result<()> {
        if self.account.is_some() {
            records.save_value(SESSION_KEY, self).await
        } else {
            records.clear(SESSION_KEY).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn profile() -> AccountProfile {
        AccountProfile {
            id: "u1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
        }
    }

    #[tokio::test]
    async fn restore_without_stored_session_is_anonymous() {
        let records = RecordStore::new(Arc::new(MemoryStore::new()));
        let session = Session::restore(&records).await.unwrap();
        assert_eq!(session.account_id(), None);
    }

    #[tokio::test]
    async fn persisted_session_survives_restart() {
        let records = RecordStore::new(Arc::new(MemoryStore::new()));

        Session::signed_in(profile()).persist(&records).await.unwrap();
        let restored = Session::restore(&records).await.unwrap();
        assert_eq!(restored.account(), Some(&profile()));

        let mut session = restored;
        session.sign_out();
        session.persist(&records).await.unwrap();
        assert_eq!(Session::restore(&records).await.unwrap(), Session::anonymous());
    }
}
