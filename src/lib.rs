//! E-Doc Transfer - demo document-transfer portal
//!
//! A single-process web application walking one user through:
//!
//! - **Signup**: phone + OTP, password, aadhaar + OTP, transfer PIN and three
//!   signature samples
//! - **Filing**: vehicle or property transfer details
//! - **Signing**: transfer PIN re-entry followed by a signature
//! - **History**: per-account transaction log with plain-text receipts
//!
//! The workflow rules live in [`workflow`] as pure transition functions; the
//! [`portal`] module wires them to HTTP.

pub mod account;
pub mod config;
pub mod error;
pub mod portal;
pub mod receipt;
pub mod session;
pub mod store;
pub mod workflow;

pub use config::{Args, Config};
pub use error::{FlowError, StoreError};
pub use portal::{create_router, AppState, SharedState};
