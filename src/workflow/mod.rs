//! Workflow state machines
//!
//! Pure transition logic with no HTTP types:
//! - [`signup`]: the nine-step account creation wizard
//! - [`login`]: credential check and session user resolution
//! - [`filing`]: file a document, authorize with the transfer PIN, sign

pub mod filing;
pub mod login;
pub mod signup;

use crate::account::TxStatus;
use signup::SignupStep;

/// Every place a workflow can send the visitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Login,
    Dashboard,
    Signup(SignupStep),
    EnterPin,
    SignDocument,
    Outcome(TxStatus),
}

/// Flash notice severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        }
    }
}

/// A message shown once on the next rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// `true` if `value` is exactly `len` ASCII digits
pub(crate) fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_digits() {
        assert!(is_digits("123456", 6));
        assert!(!is_digits("12345", 6));
        assert!(!is_digits("12345a", 6));
        assert!(!is_digits("١٢٣٤٥٦", 6));
        assert!(!is_digits("", 6));
    }
}
