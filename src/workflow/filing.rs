//! Document filing and signing
//!
//! select type -> fill form -> enter transfer PIN -> sign -> result
//!
//! The document being filed lives in the session as a [`CurrentDocument`].
//! Signing always produces a history entry, successful or not.

use super::{Notice, Step};
use crate::account::{Account, FileType, TransactionDraft, TxStatus};
use crate::error::FlowError;

/// Submitted transfer form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilingForm {
    Vehicle {
        owner_name: String,
        reg_number: String,
        to_name: String,
    },
    Property {
        owner_name: String,
        property_id: String,
        to_name: String,
    },
}

impl FilingForm {
    pub fn file_type(&self) -> FileType {
        match self {
            FilingForm::Vehicle { .. } => FileType::Vehicle,
            FilingForm::Property { .. } => FileType::Property,
        }
    }

    /// Human readable description stored with the transaction
    pub fn details(&self) -> String {
        match self {
            FilingForm::Vehicle {
                owner_name,
                reg_number,
                to_name,
            } => format!(
                "Vehicle Transfer: Owner={}, RegNo={}, To={}",
                owner_name.trim(),
                reg_number.trim(),
                to_name.trim()
            ),
            FilingForm::Property {
                owner_name,
                property_id,
                to_name,
            } => format!(
                "Property Transfer: Owner={}, PropertyID={}, To={}",
                owner_name.trim(),
                property_id.trim(),
                to_name.trim()
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStage {
    AwaitingPin,
    /// PIN accepted, signature pending
    Authorized,
}

/// Document being filed in this session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentDocument {
    pub file_type: FileType,
    pub details: String,
    pub stage: DocumentStage,
}

impl CurrentDocument {
    pub fn from_form(form: &FilingForm) -> Self {
        Self {
            file_type: form.file_type(),
            details: form.details(),
            stage: DocumentStage::AwaitingPin,
        }
    }
}

/// Decides whether a signature is accepted
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, account: &Account, signature: &str) -> bool;
}

/// Accepts any signature from an account that has at least one stored
/// sample. Placeholder until real signature comparison exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct StoredSampleVerifier;

impl SignatureVerifier for StoredSampleVerifier {
    fn verify(&self, account: &Account, _signature: &str) -> bool {
        !account.signatures.is_empty()
    }
}

/// Document waiting for its PIN (or already authorized)
pub fn pending_document(doc: Option<&CurrentDocument>) -> Result<&CurrentDocument, FlowError> {
    doc.ok_or_else(|| FlowError::state("Please select a file first.", Step::Dashboard))
}

/// Document whose PIN has been accepted
pub fn authorized_document(doc: Option<&CurrentDocument>) -> Result<&CurrentDocument, FlowError> {
    let doc = doc.ok_or_else(|| FlowError::state("No document in progress.", Step::Dashboard))?;
    match doc.stage {
        DocumentStage::Authorized => Ok(doc),
        DocumentStage::AwaitingPin => Err(FlowError::state(
            "Enter your transfer PIN first.",
            Step::EnterPin,
        )),
    }
}

/// Check the transfer PIN and return the authorized document
pub fn authorize(
    doc: Option<&CurrentDocument>,
    account: &Account,
    pin: &str,
) -> Result<CurrentDocument, FlowError> {
    let doc = pending_document(doc)?;
    if pin.trim() != account.transfer_pin {
        return Err(FlowError::auth("Wrong transfer PIN. Try again."));
    }
    Ok(CurrentDocument {
        stage: DocumentStage::Authorized,
        ..doc.clone()
    })
}

/// Sign the authorized document, yielding the history entry to append
pub fn sign(
    doc: Option<&CurrentDocument>,
    account: &Account,
    signature: &str,
    verifier: &dyn SignatureVerifier,
) -> Result<TransactionDraft, FlowError> {
    let doc = authorized_document(doc)?;
    let signature = signature.trim();
    if signature.is_empty() {
        return Err(FlowError::validation(
            "Please draw your signature before continuing.",
        ));
    }

    let status = if verifier.verify(account, signature) {
        TxStatus::Success
    } else {
        TxStatus::Failed
    };

    Ok(TransactionDraft {
        file_type: doc.file_type,
        status,
        details: doc.details.clone(),
    })
}

/// Notice shown on the result page
pub fn outcome_notice(status: TxStatus) -> Notice {
    match status {
        TxStatus::Success => Notice::success("Document signed successfully."),
        TxStatus::Failed => Notice::error("Signature could not be verified."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(samples: usize) -> Account {
        Account::new(
            "9876543210".into(),
            "pass".into(),
            "123412341234".into(),
            "246810".into(),
            (0..samples).map(|i| format!("sample-{i}")).collect(),
        )
    }

    fn vehicle() -> FilingForm {
        FilingForm::Vehicle {
            owner_name: "Alice".into(),
            reg_number: "KA01AB1234".into(),
            to_name: "Bob".into(),
        }
    }

    #[test]
    fn test_details_format() {
        assert_eq!(
            vehicle().details(),
            "Vehicle Transfer: Owner=Alice, RegNo=KA01AB1234, To=Bob"
        );

        let property = FilingForm::Property {
            owner_name: " Carol ".into(),
            property_id: "PLOT-42".into(),
            to_name: String::new(),
        };
        assert_eq!(property.file_type(), FileType::Property);
        assert_eq!(
            property.details(),
            "Property Transfer: Owner=Carol, PropertyID=PLOT-42, To="
        );
    }

    #[test]
    fn test_authorize_requires_matching_pin() {
        let account = account(3);
        let doc = CurrentDocument::from_form(&vehicle());

        let err = authorize(Some(&doc), &account, "000000").unwrap_err();
        assert!(matches!(err, FlowError::Auth(_)));
        assert_eq!(err.resume_at(Step::EnterPin), Step::EnterPin);

        let authorized = authorize(Some(&doc), &account, " 246810 ").unwrap();
        assert_eq!(authorized.stage, DocumentStage::Authorized);
        assert_eq!(authorized.details, doc.details);
    }

    #[test]
    fn test_authorize_without_document() {
        let err = authorize(None, &account(3), "246810").unwrap_err();
        assert_eq!(err.resume_at(Step::EnterPin), Step::Dashboard);
    }

    #[test]
    fn test_sign_requires_pin_first() {
        let doc = CurrentDocument::from_form(&vehicle());
        let err = sign(Some(&doc), &account(3), "sig", &StoredSampleVerifier).unwrap_err();
        assert_eq!(err.resume_at(Step::SignDocument), Step::EnterPin);

        let err = sign(None, &account(3), "sig", &StoredSampleVerifier).unwrap_err();
        assert_eq!(err.resume_at(Step::SignDocument), Step::Dashboard);
    }

    #[test]
    fn test_sign_outcomes() {
        let doc = authorize(
            Some(&CurrentDocument::from_form(&vehicle())),
            &account(3),
            "246810",
        )
        .unwrap();

        let err = sign(Some(&doc), &account(3), "   ", &StoredSampleVerifier).unwrap_err();
        assert!(matches!(err, FlowError::Validation(_)));

        let draft = sign(Some(&doc), &account(3), "sig", &StoredSampleVerifier).unwrap();
        assert_eq!(draft.status, TxStatus::Success);
        assert_eq!(draft.file_type, FileType::Vehicle);
        assert_eq!(
            draft.details,
            "Vehicle Transfer: Owner=Alice, RegNo=KA01AB1234, To=Bob"
        );

        let draft = sign(Some(&doc), &account(0), "sig", &StoredSampleVerifier).unwrap();
        assert_eq!(draft.status, TxStatus::Failed);
    }

    #[test]
    fn test_custom_verifier() {
        struct RejectAll;
        impl SignatureVerifier for RejectAll {
            fn verify(&self, _: &Account, _: &str) -> bool {
                false
            }
        }

        let doc = CurrentDocument {
            stage: DocumentStage::Authorized,
            ..CurrentDocument::from_form(&vehicle())
        };
        let draft = sign(Some(&doc), &account(3), "sig", &RejectAll).unwrap();
        assert_eq!(draft.status, TxStatus::Failed);
    }
}
