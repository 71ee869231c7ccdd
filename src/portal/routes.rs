//! Portal HTTP routes
//!
//! Handlers resolve the session, run the workflow step and answer with a
//! page or a 303 redirect. Failures never surface as error statuses; they
//! become a notice on the page the visitor is sent back to.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Extension, Form,
};
use serde::Deserialize;
use tracing::{info, warn};

use super::{see_other, views, CurrentUser, SessionId, SharedState};
use crate::error::FlowError;
use crate::receipt;
use crate::workflow::filing::{self, CurrentDocument, FilingForm};
use crate::workflow::login;
use crate::workflow::signup::{SignupInput, SignupOutcome, SignupStep};
use crate::workflow::{Notice, Step};

// === Forms ===

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub mobile: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MobileForm {
    pub mobile: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OtpForm {
    pub otp: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PasswordForm {
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AadhaarForm {
    pub aadhaar: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PinForm {
    pub pin: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignatureForm {
    pub signature_data: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VehicleForm {
    pub owner_name: String,
    pub reg_number: String,
    pub to_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PropertyForm {
    pub owner_name: String,
    pub property_id: String,
    pub to_name: String,
}

// === Home / login ===

/// GET / - dashboard when signed in, login otherwise
pub async fn index(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
) -> Response {
    let mobile = state.sessions.update(&session.0, |data| data.mobile.clone());
    match login::current_user(state.users.as_ref(), mobile.as_deref()) {
        Ok(_) => see_other(Step::Dashboard),
        Err(_) => see_other(Step::Login),
    }
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    "OK"
}

/// GET /login
pub async fn login_page(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
) -> Response {
    let notices = take_notices(&state, &session);
    views::login(&notices).into_response()
}

/// POST /login
pub async fn login(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
    Form(form): Form<LoginForm>,
) -> Response {
    match login::authenticate(state.users.as_ref(), &form.mobile, &form.password) {
        Ok(account) => {
            info!(mobile = %account.mobile, "Signed in");
            state.sessions.update(&session.0, |data| {
                data.mobile = Some(account.mobile.clone());
                data.flash(Notice::success("Signed in successfully."));
            });
            see_other(Step::Dashboard)
        }
        Err(err) => {
            warn!("Failed login attempt");
            state.detour(&session, Step::Login, err)
        }
    }
}

/// GET /logout - drop the session and start a fresh one for the notice
pub async fn logout(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
) -> Response {
    state.sessions.destroy(&session.0);

    let fresh = state.sessions.create();
    state
        .sessions
        .update(&fresh, |data| data.flash(Notice::info("Logged out.")));

    let mut response = see_other(Step::Login);
    response.extensions_mut().insert(SessionId(fresh));
    response
}

// === Signup wizard ===

fn show_signup(state: &SharedState, session: &SessionId, step: SignupStep) -> Response {
    let progress = state.sessions.update(&session.0, |data| data.signup.clone());
    if let Err(err) = state.signup.guard(progress.as_ref(), step) {
        return state.detour(session, Step::Signup(step), err);
    }
    let notices = take_notices(state, session);
    views::signup(step, progress.as_ref(), state.signup.demo_otp(), &notices).into_response()
}

fn submit_signup(state: &SharedState, session: &SessionId, input: SignupInput) -> Response {
    let step = input.step();
    let progress = state.sessions.update(&session.0, |data| data.signup.clone());

    let outcome = match state
        .signup
        .submit(progress.as_ref(), input, state.users.as_ref())
    {
        Ok(outcome) => outcome,
        Err(err) => return state.detour(session, Step::Signup(step), err),
    };

    match outcome {
        SignupOutcome::Continue {
            state: next_state,
            next,
            notice,
        } => {
            if step == SignupStep::Phone {
                info!(mobile = %next_state.mobile(), "Signup started");
            }
            state.sessions.update(&session.0, |data| {
                data.signup = Some(next_state);
                if let Some(notice) = notice {
                    data.flash(notice);
                }
            });
            see_other(Step::Signup(next))
        }
        SignupOutcome::Finished(account) => {
            let mobile = account.mobile.clone();
            state.sessions.update(&session.0, |data| data.signup = None);

            match state.users.create(account) {
                Ok(()) => {
                    info!(mobile = %mobile, "Account created");
                    state.sessions.update(&session.0, |data| {
                        data.flash(Notice::success("Account created successfully. Please login."))
                    });
                    see_other(Step::Signup(SignupStep::Done))
                }
                Err(e) => {
                    warn!(error = %e, "Signup lost a registration race");
                    state.detour(session, Step::Signup(step), e.into())
                }
            }
        }
    }
}

/// GET /signup/phone - starts over
pub async fn signup_phone_page(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
) -> Response {
    state.sessions.update(&session.0, |data| data.signup = None);
    show_signup(&state, &session, SignupStep::Phone)
}

pub async fn signup_phone(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
    Form(form): Form<MobileForm>,
) -> Response {
    submit_signup(&state, &session, SignupInput::Phone(form.mobile))
}

pub async fn signup_phone_otp_page(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
) -> Response {
    show_signup(&state, &session, SignupStep::PhoneOtp)
}

pub async fn signup_phone_otp(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
    Form(form): Form<OtpForm>,
) -> Response {
    submit_signup(&state, &session, SignupInput::PhoneOtp(form.otp))
}

pub async fn signup_password_page(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
) -> Response {
    show_signup(&state, &session, SignupStep::Password)
}

pub async fn signup_password(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
    Form(form): Form<PasswordForm>,
) -> Response {
    submit_signup(&state, &session, SignupInput::Password(form.password))
}

pub async fn signup_aadhaar_page(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
) -> Response {
    show_signup(&state, &session, SignupStep::Aadhaar)
}

pub async fn signup_aadhaar(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
    Form(form): Form<AadhaarForm>,
) -> Response {
    submit_signup(&state, &session, SignupInput::Aadhaar(form.aadhaar))
}

pub async fn signup_aadhaar_otp_page(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
) -> Response {
    show_signup(&state, &session, SignupStep::AadhaarOtp)
}

pub async fn signup_aadhaar_otp(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
    Form(form): Form<OtpForm>,
) -> Response {
    submit_signup(&state, &session, SignupInput::AadhaarOtp(form.otp))
}

pub async fn signup_pin_page(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
) -> Response {
    show_signup(&state, &session, SignupStep::Pin)
}

pub async fn signup_pin(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
    Form(form): Form<PinForm>,
) -> Response {
    submit_signup(&state, &session, SignupInput::Pin(form.pin))
}

/// Unparsable or out-of-range step numbers map to 0, which the wizard rejects
fn signature_step(raw: &str) -> u8 {
    raw.parse().unwrap_or(0)
}

pub async fn signup_signature_page(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
    Path(step): Path<String>,
) -> Response {
    show_signup(&state, &session, SignupStep::Signature(signature_step(&step)))
}

pub async fn signup_signature(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
    Path(step): Path<String>,
    Form(form): Form<SignatureForm>,
) -> Response {
    submit_signup(
        &state,
        &session,
        SignupInput::Signature {
            step: signature_step(&step),
            data: form.signature_data,
        },
    )
}

pub async fn signup_done(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
) -> Response {
    show_signup(&state, &session, SignupStep::Done)
}

// === Dashboard / filing ===

/// GET /dashboard - history and document type selection
pub async fn dashboard(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
    CurrentUser(account): CurrentUser,
) -> Response {
    let notices = take_notices(&state, &session);
    views::dashboard(&account, &notices).into_response()
}

pub async fn vehicle_form(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
    CurrentUser(_): CurrentUser,
) -> Response {
    let notices = take_notices(&state, &session);
    views::vehicle_form(&notices).into_response()
}

pub async fn file_vehicle(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
    CurrentUser(_): CurrentUser,
    Form(form): Form<VehicleForm>,
) -> Response {
    file_document(
        &state,
        &session,
        FilingForm::Vehicle {
            owner_name: form.owner_name,
            reg_number: form.reg_number,
            to_name: form.to_name,
        },
    )
}

pub async fn property_form(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
    CurrentUser(_): CurrentUser,
) -> Response {
    let notices = take_notices(&state, &session);
    views::property_form(&notices).into_response()
}

pub async fn file_property(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
    CurrentUser(_): CurrentUser,
    Form(form): Form<PropertyForm>,
) -> Response {
    file_document(
        &state,
        &session,
        FilingForm::Property {
            owner_name: form.owner_name,
            property_id: form.property_id,
            to_name: form.to_name,
        },
    )
}

fn file_document(state: &SharedState, session: &SessionId, form: FilingForm) -> Response {
    let doc = CurrentDocument::from_form(&form);
    state
        .sessions
        .update(&session.0, |data| data.current_doc = Some(doc));
    see_other(Step::EnterPin)
}

// === PIN / signing ===

pub async fn enter_pin_page(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
    CurrentUser(_): CurrentUser,
) -> Response {
    let doc = state.sessions.update(&session.0, |data| data.current_doc.clone());
    match filing::pending_document(doc.as_ref()) {
        Ok(doc) => {
            let notices = take_notices(&state, &session);
            views::enter_pin(doc, &notices).into_response()
        }
        Err(err) => state.detour(&session, Step::EnterPin, err),
    }
}

pub async fn enter_pin(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
    CurrentUser(account): CurrentUser,
    Form(form): Form<PinForm>,
) -> Response {
    let doc = state.sessions.update(&session.0, |data| data.current_doc.clone());
    match filing::authorize(doc.as_ref(), &account, &form.pin) {
        Ok(authorized) => {
            state
                .sessions
                .update(&session.0, |data| data.current_doc = Some(authorized));
            see_other(Step::SignDocument)
        }
        Err(err) => {
            warn!(mobile = %account.mobile, "Transfer PIN rejected");
            state.detour(&session, Step::EnterPin, err)
        }
    }
}

pub async fn sign_document_page(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
    CurrentUser(_): CurrentUser,
) -> Response {
    let doc = state.sessions.update(&session.0, |data| data.current_doc.clone());
    match filing::authorized_document(doc.as_ref()) {
        Ok(doc) => {
            let notices = take_notices(&state, &session);
            views::sign_document(doc, &notices).into_response()
        }
        Err(err) => state.detour(&session, Step::SignDocument, err),
    }
}

pub async fn sign_document(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
    CurrentUser(account): CurrentUser,
    Form(form): Form<SignatureForm>,
) -> Response {
    // Consume the document under the session lock so a double submit signs once
    let signed = state.sessions.update(&session.0, |data| {
        let draft = filing::sign(
            data.current_doc.as_ref(),
            &account,
            &form.signature_data,
            state.verifier.as_ref(),
        )?;
        data.current_doc = None;
        Ok::<_, FlowError>(draft)
    });
    let draft = match signed {
        Ok(draft) => draft,
        Err(err) => return state.detour(&session, Step::SignDocument, err),
    };

    let record = match state.users.append_transaction(&account.mobile, draft) {
        Ok(record) => record,
        Err(e) => return state.detour(&session, Step::SignDocument, e.into()),
    };
    info!(
        mobile = %account.mobile,
        doc_id = record.id,
        file_type = %record.file_type,
        status = %record.status,
        "Document signed"
    );

    state.sessions.update(&session.0, |data| {
        data.last_doc_id = Some(record.id);
        data.flash(filing::outcome_notice(record.status));
    });
    see_other(Step::Outcome(record.status))
}

// === Results / receipts ===

pub async fn result_success(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
    CurrentUser(_): CurrentUser,
) -> Response {
    let last_doc_id = state.sessions.update(&session.0, |data| data.last_doc_id);
    let Some(doc_id) = last_doc_id else {
        return see_other(Step::Dashboard);
    };
    let notices = take_notices(&state, &session);
    views::result_success(doc_id, &notices).into_response()
}

pub async fn result_failure(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
    CurrentUser(_): CurrentUser,
) -> Response {
    let notices = take_notices(&state, &session);
    views::result_failure(&notices).into_response()
}

/// GET /download/:doc_id - plain-text receipt
pub async fn download(
    State(state): State<SharedState>,
    Extension(session): Extension<SessionId>,
    CurrentUser(account): CurrentUser,
    Path(doc_id): Path<String>,
) -> Response {
    match receipt::find(&account, &doc_id) {
        Ok(receipt) => (
            [
                (header::CONTENT_TYPE, receipt::CONTENT_TYPE.to_string()),
                (header::CONTENT_DISPOSITION, receipt.content_disposition()),
            ],
            receipt.body,
        )
            .into_response(),
        Err(err) => {
            info!(mobile = %account.mobile, doc_id = %doc_id, "Receipt not found");
            state.detour(&session, Step::Dashboard, err)
        }
    }
}

fn take_notices(state: &SharedState, session: &SessionId) -> Vec<Notice> {
    state.sessions.update(&session.0, |data| data.take_notices())
}
