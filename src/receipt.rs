//! Plain-text transfer receipts

use crate::account::{Account, TransactionRecord};
use crate::error::FlowError;

pub const CONTENT_TYPE: &str = "text/plain";

/// Downloadable copy of one history entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub filename: String,
    pub body: String,
}

impl Receipt {
    pub fn for_record(record: &TransactionRecord) -> Self {
        Self {
            filename: format!("transfer_{}.txt", record.id),
            body: format!(
                "E-Doc Transfer Copy\n\nType: {}\nStatus: {}\nDetails: {}\n",
                record.file_type, record.status, record.details
            ),
        }
    }

    pub fn content_disposition(&self) -> String {
        format!("attachment; filename={}", self.filename)
    }
}

/// Receipt for `doc_id` in the account's history
pub fn lookup(account: &Account, doc_id: u64) -> Result<Receipt, FlowError> {
    account
        .transaction(doc_id)
        .map(Receipt::for_record)
        .ok_or_else(not_found)
}

/// Like [`lookup`], for an id taken straight from the URL. Anything that is
/// not a known id, including text and numbers past `u64`, is not found.
pub fn find(account: &Account, raw_id: &str) -> Result<Receipt, FlowError> {
    let doc_id = raw_id.parse().map_err(|_| not_found())?;
    lookup(account, doc_id)
}

fn not_found() -> FlowError {
    FlowError::NotFound("Document not found.".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{FileType, TransactionDraft, TxStatus};
    use crate::workflow::Step;

    #[test]
    fn test_receipt_format() {
        let mut account = Account::new(
            "9876543210".into(),
            "pass".into(),
            "123412341234".into(),
            "246810".into(),
            vec![],
        );
        account.record(TransactionDraft {
            file_type: FileType::Vehicle,
            status: TxStatus::Success,
            details: "Vehicle Transfer: Owner=Alice, RegNo=KA01AB1234, To=Bob".into(),
        });

        let receipt = lookup(&account, 1).unwrap();
        assert_eq!(receipt.filename, "transfer_1.txt");
        assert_eq!(
            receipt.content_disposition(),
            "attachment; filename=transfer_1.txt"
        );
        assert_eq!(
            receipt.body,
            "E-Doc Transfer Copy\n\n\
             Type: vehicle\n\
             Status: success\n\
             Details: Vehicle Transfer: Owner=Alice, RegNo=KA01AB1234, To=Bob\n"
        );

        let err = lookup(&account, 2).unwrap_err();
        assert_eq!(err.resume_at(Step::Dashboard), Step::Dashboard);
        assert!(matches!(err, FlowError::NotFound(_)));
    }

    #[test]
    fn test_find_by_raw_id() {
        let mut account = Account::new(
            "9876543210".into(),
            "pass".into(),
            "123412341234".into(),
            "246810".into(),
            vec![],
        );
        account.record(TransactionDraft {
            file_type: FileType::Property,
            status: TxStatus::Failed,
            details: "Property Transfer: Owner=A, PropertyID=P-1, To=B".into(),
        });

        assert_eq!(find(&account, "1").unwrap().filename, "transfer_1.txt");
        for raw in ["2", "abc", "-1", "99999999999999999999999"] {
            let err = find(&account, raw).unwrap_err();
            assert_eq!(err, FlowError::NotFound("Document not found.".into()), "{raw}");
        }
    }
}
