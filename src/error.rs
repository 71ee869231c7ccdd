//! Error types
//!
//! Every workflow failure resolves to a redirect plus a notice; nothing here
//! is fatal to the visitor.

use crate::workflow::{Notice, Step};

/// Why a workflow step did not advance
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    /// Malformed input (length, format). Stay on the step.
    #[error("{0}")]
    Validation(String),

    /// Wrong password, OTP or PIN. Stay on the step.
    #[error("{0}")]
    Auth(String),

    /// A prerequisite step is missing. Resume at `resume`.
    #[error("{message}")]
    State { message: String, resume: Step },

    /// Unknown document id
    #[error("{0}")]
    NotFound(String),
}

impl FlowError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    pub fn state(message: impl Into<String>, resume: Step) -> Self {
        Self::State {
            message: message.into(),
            resume,
        }
    }

    pub fn login_required() -> Self {
        Self::state("Please login.", Step::Login)
    }

    /// Step to send the visitor to after this error, given the one they were on
    pub fn resume_at(&self, current: Step) -> Step {
        match self {
            Self::Validation(_) | Self::Auth(_) => current,
            Self::State { resume, .. } => *resume,
            Self::NotFound(_) => Step::Dashboard,
        }
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Auth(_) => "auth",
            Self::State { .. } => "state",
            Self::NotFound(_) => "not_found",
        }
    }

    pub fn notice(&self) -> Notice {
        Notice::error(self.to_string())
    }
}

/// User store failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("mobile number {0} is already registered")]
    AlreadyRegistered(String),

    #[error("no account for mobile number {0}")]
    UnknownAccount(String),
}

impl From<StoreError> for FlowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyRegistered(_) => FlowError::state(
                "This mobile number is already registered. Please login.",
                Step::Login,
            ),
            StoreError::UnknownAccount(_) => FlowError::login_required(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::signup::SignupStep;

    #[test]
    fn test_resume_targets() {
        let here = Step::Signup(SignupStep::Password);

        assert_eq!(FlowError::validation("short").resume_at(here), here);
        assert_eq!(FlowError::auth("wrong").resume_at(here), here);
        assert_eq!(
            FlowError::state("go back", Step::Signup(SignupStep::Phone)).resume_at(here),
            Step::Signup(SignupStep::Phone)
        );
        assert_eq!(
            FlowError::NotFound("gone".into()).resume_at(here),
            Step::Dashboard
        );
    }

    #[test]
    fn test_store_errors_map_to_login() {
        let err: FlowError = StoreError::AlreadyRegistered("1".into()).into();
        assert_eq!(err.resume_at(Step::Dashboard), Step::Login);

        let err: FlowError = StoreError::UnknownAccount("1".into()).into();
        assert_eq!(err, FlowError::login_required());
        assert_eq!(err.notice().message, "Please login.");
    }
}
