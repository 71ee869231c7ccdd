//! User store
//!
//! Accounts live for the process lifetime. Every mutation of an account
//! happens under that account's map entry lock, so concurrent signings get
//! distinct ids and concurrent signups for one mobile commit at most once.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::account::{Account, TransactionDraft, TransactionRecord};
use crate::error::StoreError;

/// Account storage used by the portal
pub trait UserStore: Send + Sync {
    /// Whether `mobile` already has an account
    fn contains(&self, mobile: &str) -> bool;

    /// Snapshot of the account for `mobile`
    fn get(&self, mobile: &str) -> Option<Account>;

    /// Insert a new account. Fails if the mobile is taken.
    fn create(&self, account: Account) -> Result<(), StoreError>;

    /// Append to the account's history and return the stored record
    fn append_transaction(
        &self,
        mobile: &str,
        draft: TransactionDraft,
    ) -> Result<TransactionRecord, StoreError>;

    /// Number of registered accounts
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory store, reset on restart
#[derive(Default)]
pub struct MemoryUserStore {
    accounts: DashMap<String, Account>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for MemoryUserStore {
    fn contains(&self, mobile: &str) -> bool {
        self.accounts.contains_key(mobile)
    }

    fn get(&self, mobile: &str) -> Option<Account> {
        self.accounts.get(mobile).map(|account| account.clone())
    }

    fn create(&self, account: Account) -> Result<(), StoreError> {
        match self.accounts.entry(account.mobile.clone()) {
            Entry::Occupied(entry) => Err(StoreError::AlreadyRegistered(entry.key().clone())),
            Entry::Vacant(entry) => {
                debug!(mobile = %account.mobile, "Storing new account");
                entry.insert(account);
                Ok(())
            }
        }
    }

    fn append_transaction(
        &self,
        mobile: &str,
        draft: TransactionDraft,
    ) -> Result<TransactionRecord, StoreError> {
        let mut account = self
            .accounts
            .get_mut(mobile)
            .ok_or_else(|| StoreError::UnknownAccount(mobile.to_string()))?;
        Ok(account.record(draft))
    }

    fn len(&self) -> usize {
        self.accounts.len()
    }
}
