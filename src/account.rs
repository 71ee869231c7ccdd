//! Account and transaction records owned by the user store

use chrono::{DateTime, Utc};
use std::fmt;

/// Kind of transfer document being filed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Vehicle,
    Property,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Vehicle => "vehicle",
            FileType::Property => "property",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a signing attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Success,
    Failed,
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Success => "success",
            TxStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of an account's append-only history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    /// Unique within the owning account, starts at 1
    pub id: u64,
    pub file_type: FileType,
    pub status: TxStatus,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

/// A record waiting for the store to assign its id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    pub file_type: FileType,
    pub status: TxStatus,
    pub details: String,
}

/// A registered user, keyed by mobile number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub mobile: String,
    /// Stored as entered. This is a demo service.
    pub password: String,
    /// 12-digit national id
    pub aadhaar: String,
    /// 6-digit PIN required before every signing
    pub transfer_pin: String,
    /// Samples collected at signup
    pub signatures: Vec<String>,
    pub history: Vec<TransactionRecord>,
    next_transaction_id: u64,
}

impl Account {
    pub fn new(
        mobile: String,
        password: String,
        aadhaar: String,
        transfer_pin: String,
        signatures: Vec<String>,
    ) -> Self {
        Self {
            mobile,
            password,
            aadhaar,
            transfer_pin,
            signatures,
            history: Vec::new(),
            next_transaction_id: 1,
        }
    }

    /// Append a draft to history, assigning the next id.
    ///
    /// Callers must hold exclusive access to the account; the store does this
    /// through its per-account lock.
    pub fn record(&mut self, draft: TransactionDraft) -> TransactionRecord {
        let record = TransactionRecord {
            id: self.next_transaction_id,
            file_type: draft.file_type,
            status: draft.status,
            details: draft.details,
            created_at: Utc::now(),
        };
        self.next_transaction_id += 1;
        self.history.push(record.clone());
        record
    }

    /// Linear scan of history for `id`
    pub fn transaction(&self, id: u64) -> Option<&TransactionRecord> {
        self.history.iter().find(|record| record.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account::new(
            "9876543210".to_string(),
            "hunter2".to_string(),
            "123412341234".to_string(),
            "246810".to_string(),
            vec!["a".into(), "b".into(), "c".into()],
        )
    }

    fn draft(details: &str) -> TransactionDraft {
        TransactionDraft {
            file_type: FileType::Property,
            status: TxStatus::Failed,
            details: details.to_string(),
        }
    }

    #[test]
    fn test_ids_follow_history_length() {
        let mut account = account();
        assert!(account.history.is_empty());

        let first = account.record(draft("one"));
        let second = account.record(draft("two"));

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(account.history.len(), 2);
        assert_eq!(account.transaction(2).map(|r| r.details.as_str()), Some("two"));
        assert!(account.transaction(3).is_none());
    }

    #[test]
    fn test_enum_rendering() {
        assert_eq!(FileType::Vehicle.to_string(), "vehicle");
        assert_eq!(FileType::Property.to_string(), "property");
        assert_eq!(TxStatus::Success.to_string(), "success");
        assert_eq!(TxStatus::Failed.to_string(), "failed");
    }
}
