//! Login and session user resolution

use crate::account::Account;
use crate::error::FlowError;
use crate::store::UserStore;

const LOGIN_FAILED: &str = "Wrong mobile number or password.";

/// Check credentials. Unknown mobile and wrong password fail identically.
pub fn authenticate(
    users: &dyn UserStore,
    mobile: &str,
    password: &str,
) -> Result<Account, FlowError> {
    match users.get(mobile.trim()) {
        Some(account) if account.password == password.trim() => Ok(account),
        _ => Err(FlowError::auth(LOGIN_FAILED)),
    }
}

/// Account bound to the session, if it still exists
pub fn current_user(users: &dyn UserStore, mobile: Option<&str>) -> Result<Account, FlowError> {
    mobile
        .and_then(|mobile| users.get(mobile))
        .ok_or_else(FlowError::login_required)
}
