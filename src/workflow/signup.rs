//! Signup wizard
//!
//! phone -> phone OTP -> password -> aadhaar -> aadhaar OTP -> transfer PIN
//! -> signature 1 -> signature 2 -> signature 3 -> done
//!
//! [`SignupState`] names the next step and carries only what earlier steps
//! produced. A step may be shown or submitted once every step before it has
//! succeeded; submitting an already-completed step rewinds to it. Nothing
//! reaches the user store until the third signature, when the wizard hands
//! back a complete [`Account`].

use super::{is_digits, Notice, Step};
use crate::account::Account;
use crate::error::FlowError;
use crate::store::UserStore;

pub const SIGNATURE_SAMPLES: u8 = 3;
pub const MIN_PASSWORD_LEN: usize = 4;
pub const AADHAAR_LEN: usize = 12;
pub const PIN_LEN: usize = 6;

/// Wizard steps in required order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SignupStep {
    Phone,
    PhoneOtp,
    Password,
    Aadhaar,
    AadhaarOtp,
    Pin,
    /// Signature sample 1..=3
    Signature(u8),
    Done,
}

/// Signup in progress, stored in the visitor's session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupState {
    AwaitingPhoneOtp {
        mobile: String,
        phone_otp: String,
    },
    AwaitingPassword {
        mobile: String,
    },
    AwaitingAadhaar {
        mobile: String,
        password: String,
    },
    AwaitingAadhaarOtp {
        mobile: String,
        password: String,
        aadhaar: String,
        aadhaar_otp: String,
    },
    AwaitingPin {
        mobile: String,
        password: String,
        aadhaar: String,
    },
    AwaitingSignatures {
        mobile: String,
        password: String,
        aadhaar: String,
        transfer_pin: String,
        signatures: Vec<String>,
    },
}

impl SignupState {
    pub fn mobile(&self) -> &str {
        match self {
            Self::AwaitingPhoneOtp { mobile, .. }
            | Self::AwaitingPassword { mobile }
            | Self::AwaitingAadhaar { mobile, .. }
            | Self::AwaitingAadhaarOtp { mobile, .. }
            | Self::AwaitingPin { mobile, .. }
            | Self::AwaitingSignatures { mobile, .. } => mobile,
        }
    }

    pub fn password(&self) -> Option<&str> {
        match self {
            Self::AwaitingAadhaar { password, .. }
            | Self::AwaitingAadhaarOtp { password, .. }
            | Self::AwaitingPin { password, .. }
            | Self::AwaitingSignatures { password, .. } => Some(password),
            _ => None,
        }
    }

    pub fn aadhaar(&self) -> Option<&str> {
        match self {
            Self::AwaitingAadhaarOtp { aadhaar, .. }
            | Self::AwaitingPin { aadhaar, .. }
            | Self::AwaitingSignatures { aadhaar, .. } => Some(aadhaar),
            _ => None,
        }
    }

    pub fn signatures(&self) -> &[String] {
        match self {
            Self::AwaitingSignatures { signatures, .. } => signatures,
            _ => &[],
        }
    }

    /// Earliest step that has not succeeded yet
    pub fn next_step(&self) -> SignupStep {
        match self {
            Self::AwaitingPhoneOtp { .. } => SignupStep::PhoneOtp,
            Self::AwaitingPassword { .. } => SignupStep::Password,
            Self::AwaitingAadhaar { .. } => SignupStep::Aadhaar,
            Self::AwaitingAadhaarOtp { .. } => SignupStep::AadhaarOtp,
            Self::AwaitingPin { .. } => SignupStep::Pin,
            Self::AwaitingSignatures { signatures, .. } => {
                SignupStep::Signature(signatures.len() as u8 + 1)
            }
        }
    }
}

/// A submitted wizard form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupInput {
    Phone(String),
    PhoneOtp(String),
    Password(String),
    Aadhaar(String),
    AadhaarOtp(String),
    Pin(String),
    Signature { step: u8, data: String },
}

impl SignupInput {
    pub fn step(&self) -> SignupStep {
        match self {
            Self::Phone(_) => SignupStep::Phone,
            Self::PhoneOtp(_) => SignupStep::PhoneOtp,
            Self::Password(_) => SignupStep::Password,
            Self::Aadhaar(_) => SignupStep::Aadhaar,
            Self::AadhaarOtp(_) => SignupStep::AadhaarOtp,
            Self::Pin(_) => SignupStep::Pin,
            Self::Signature { step, .. } => SignupStep::Signature(*step),
        }
    }
}

/// Result of an accepted submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupOutcome {
    /// Store `state` in the session and go to `next`
    Continue {
        state: SignupState,
        next: SignupStep,
        notice: Option<Notice>,
    },
    /// Third signature collected. The caller commits the account and clears
    /// the signup state.
    Finished(Account),
}

/// Signup transition rules
#[derive(Debug, Clone)]
pub struct SignupMachine {
    demo_otp: String,
}

impl SignupMachine {
    pub fn new(demo_otp: impl Into<String>) -> Self {
        Self {
            demo_otp: demo_otp.into(),
        }
    }

    /// Code issued for every OTP challenge
    pub fn demo_otp(&self) -> &str {
        &self.demo_otp
    }

    /// Check that `step` may be shown or submitted
    pub fn guard(&self, state: Option<&SignupState>, step: SignupStep) -> Result<(), FlowError> {
        match step {
            SignupStep::Phone | SignupStep::Done => return Ok(()),
            SignupStep::Signature(n) if !(1..=SIGNATURE_SAMPLES).contains(&n) => {
                return Err(FlowError::state(
                    "Invalid signature step.",
                    Step::Signup(SignupStep::Pin),
                ));
            }
            _ => {}
        }

        let Some(state) = state else {
            return Err(expired());
        };

        let next = state.next_step();
        if step <= next {
            Ok(())
        } else {
            Err(FlowError::state(prerequisite_notice(next), Step::Signup(next)))
        }
    }

    /// Apply one submission to the signup in progress
    pub fn submit(
        &self,
        state: Option<&SignupState>,
        input: SignupInput,
        users: &dyn UserStore,
    ) -> Result<SignupOutcome, FlowError> {
        self.guard(state, input.step())?;

        match input {
            SignupInput::Phone(mobile) => self.start(mobile.trim(), users),

            SignupInput::PhoneOtp(otp) => {
                let state = state.ok_or_else(expired)?;
                let issued = match state {
                    SignupState::AwaitingPhoneOtp { phone_otp, .. } => phone_otp.as_str(),
                    _ => self.demo_otp.as_str(),
                };
                if otp.trim() != issued {
                    return Err(FlowError::auth(format!(
                        "Wrong OTP. Try again. (Demo OTP is {})",
                        self.demo_otp
                    )));
                }
                Ok(SignupOutcome::Continue {
                    state: SignupState::AwaitingPassword {
                        mobile: state.mobile().to_string(),
                    },
                    next: SignupStep::Password,
                    notice: Some(Notice::success("Mobile number verified.")),
                })
            }

            SignupInput::Password(password) => {
                let state = state.ok_or_else(expired)?;
                let password = password.trim();
                if password.chars().count() < MIN_PASSWORD_LEN {
                    return Err(FlowError::validation(format!(
                        "Password must be at least {} characters.",
                        MIN_PASSWORD_LEN
                    )));
                }
                Ok(SignupOutcome::Continue {
                    state: SignupState::AwaitingAadhaar {
                        mobile: state.mobile().to_string(),
                        password: password.to_string(),
                    },
                    next: SignupStep::Aadhaar,
                    notice: None,
                })
            }

            SignupInput::Aadhaar(aadhaar) => {
                let state = state.ok_or_else(expired)?;
                let password = require(state.password(), SignupStep::Password)?;
                let aadhaar = aadhaar.trim();
                if !is_digits(aadhaar, AADHAAR_LEN) {
                    return Err(FlowError::validation("Enter a 12-digit Aadhaar number."));
                }
                Ok(SignupOutcome::Continue {
                    state: SignupState::AwaitingAadhaarOtp {
                        mobile: state.mobile().to_string(),
                        password: password.to_string(),
                        aadhaar: aadhaar.to_string(),
                        aadhaar_otp: self.demo_otp.clone(),
                    },
                    next: SignupStep::AadhaarOtp,
                    notice: Some(Notice::info(format!(
                        "OTP is sent to the Aadhaar registered mobile number. (Demo OTP: {})",
                        self.demo_otp
                    ))),
                })
            }

            SignupInput::AadhaarOtp(otp) => {
                let state = state.ok_or_else(expired)?;
                let password = require(state.password(), SignupStep::Password)?;
                let aadhaar = require(state.aadhaar(), SignupStep::Aadhaar)?;
                let issued = match state {
                    SignupState::AwaitingAadhaarOtp { aadhaar_otp, .. } => aadhaar_otp.as_str(),
                    _ => self.demo_otp.as_str(),
                };
                if otp.trim() != issued {
                    return Err(FlowError::auth(format!(
                        "Wrong OTP for Aadhaar. (Demo OTP is {})",
                        self.demo_otp
                    )));
                }
                Ok(SignupOutcome::Continue {
                    state: SignupState::AwaitingPin {
                        mobile: state.mobile().to_string(),
                        password: password.to_string(),
                        aadhaar: aadhaar.to_string(),
                    },
                    next: SignupStep::Pin,
                    notice: Some(Notice::success("Aadhaar verified.")),
                })
            }

            SignupInput::Pin(pin) => {
                let state = state.ok_or_else(expired)?;
                let password = require(state.password(), SignupStep::Password)?;
                let aadhaar = require(state.aadhaar(), SignupStep::Aadhaar)?;
                let pin = pin.trim();
                if !is_digits(pin, PIN_LEN) {
                    return Err(FlowError::validation("Transfer PIN must be 6 digits."));
                }
                Ok(SignupOutcome::Continue {
                    state: SignupState::AwaitingSignatures {
                        mobile: state.mobile().to_string(),
                        password: password.to_string(),
                        aadhaar: aadhaar.to_string(),
                        transfer_pin: pin.to_string(),
                        signatures: Vec::new(),
                    },
                    next: SignupStep::Signature(1),
                    notice: None,
                })
            }

            SignupInput::Signature { step, data } => {
                let Some(SignupState::AwaitingSignatures {
                    mobile,
                    password,
                    aadhaar,
                    transfer_pin,
                    signatures,
                }) = state
                else {
                    return Err(FlowError::state(
                        prerequisite_notice(SignupStep::Pin),
                        Step::Signup(SignupStep::Pin),
                    ));
                };

                let data = data.trim();
                if data.is_empty() {
                    return Err(FlowError::validation(
                        "Please draw your signature before continuing.",
                    ));
                }

                // Sample `step` replaces anything collected from `step` onwards
                let mut signatures = signatures.clone();
                signatures.truncate(usize::from(step - 1));
                signatures.push(data.to_string());

                if step < SIGNATURE_SAMPLES {
                    return Ok(SignupOutcome::Continue {
                        state: SignupState::AwaitingSignatures {
                            mobile: mobile.clone(),
                            password: password.clone(),
                            aadhaar: aadhaar.clone(),
                            transfer_pin: transfer_pin.clone(),
                            signatures,
                        },
                        next: SignupStep::Signature(step + 1),
                        notice: None,
                    });
                }

                Ok(SignupOutcome::Finished(Account::new(
                    mobile.clone(),
                    password.clone(),
                    aadhaar.clone(),
                    transfer_pin.clone(),
                    signatures,
                )))
            }
        }
    }

    fn start(&self, mobile: &str, users: &dyn UserStore) -> Result<SignupOutcome, FlowError> {
        if mobile.is_empty() {
            return Err(FlowError::validation("Please enter mobile number."));
        }
        if users.contains(mobile) {
            return Err(FlowError::state(
                "This mobile number is already registered. Please login.",
                Step::Login,
            ));
        }

        Ok(SignupOutcome::Continue {
            state: SignupState::AwaitingPhoneOtp {
                mobile: mobile.to_string(),
                phone_otp: self.demo_otp.clone(),
            },
            next: SignupStep::PhoneOtp,
            notice: Some(Notice::info(format!(
                "OTP sent to {} (Demo OTP: {}).",
                mobile, self.demo_otp
            ))),
        })
    }
}

fn expired() -> FlowError {
    FlowError::state(
        "Signup session expired. Start again.",
        Step::Signup(SignupStep::Phone),
    )
}

fn require(field: Option<&str>, producer: SignupStep) -> Result<&str, FlowError> {
    field.ok_or_else(|| FlowError::state(prerequisite_notice(producer), Step::Signup(producer)))
}

fn prerequisite_notice(next: SignupStep) -> String {
    match next {
        SignupStep::Phone | SignupStep::Done => "Start signup first.".to_string(),
        SignupStep::PhoneOtp => "Verify mobile first.".to_string(),
        SignupStep::Password => "Set a password first.".to_string(),
        SignupStep::Aadhaar => "Complete previous step first.".to_string(),
        SignupStep::AadhaarOtp => "Complete Aadhaar verification first.".to_string(),
        SignupStep::Pin => "Set transfer PIN first.".to_string(),
        SignupStep::Signature(n) => format!("Provide signature {} first.", n),
    }
}
