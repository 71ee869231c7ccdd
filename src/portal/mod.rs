//! Portal - HTTP surface for the transfer workflows
//!
//! Provides:
//! - Session cookie middleware
//! - Login, signup wizard, filing and signing pages
//! - Receipt downloads

pub mod routes;
pub mod views;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::account::{Account, TxStatus};
use crate::config::Config;
use crate::error::FlowError;
use crate::session::SessionStore;
use crate::store::{MemoryUserStore, UserStore};
use crate::workflow::filing::{SignatureVerifier, StoredSampleVerifier};
use crate::workflow::login;
use crate::workflow::signup::{SignupMachine, SignupStep};
use crate::workflow::Step;

/// Portal state shared across handlers
pub struct AppState {
    pub config: Config,
    pub users: Arc<dyn UserStore>,
    pub sessions: SessionStore,
    pub signup: SignupMachine,
    pub verifier: Box<dyn SignatureVerifier>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: Config) -> Self {
        Self::with_store(config, Arc::new(MemoryUserStore::new()))
    }

    pub fn with_store(config: Config, users: Arc<dyn UserStore>) -> Self {
        Self {
            sessions: SessionStore::new(config.session.ttl_secs),
            signup: SignupMachine::new(config.demo.otp.clone()),
            verifier: Box::new(StoredSampleVerifier),
            users,
            config,
        }
    }

    /// Queue an error notice and redirect to wherever `err` resumes
    pub fn detour(&self, session: &SessionId, current: Step, err: FlowError) -> Response {
        let target = err.resume_at(current);
        debug!(kind = err.kind(), ?target, "Workflow detour");
        self.sessions
            .update(&session.0, |data| data.flash(err.notice()));
        see_other(target)
    }
}

/// Session id for the current request, set by the session middleware.
///
/// A handler that rotates the session puts the new id into the response
/// extensions; the middleware then issues it as the cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

/// Signed-in account. Rejects with a redirect to login.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Account);

#[async_trait]
impl FromRequestParts<SharedState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<SessionId>().cloned() else {
            return Err(see_other(Step::Login));
        };
        let mobile = state.sessions.update(&session.0, |data| data.mobile.clone());
        login::current_user(state.users.as_ref(), mobile.as_deref())
            .map(CurrentUser)
            .map_err(|err| state.detour(&session, Step::Login, err))
    }
}

/// URL path of a workflow step
pub fn location(step: Step) -> String {
    match step {
        Step::Login => "/login".to_string(),
        Step::Dashboard => "/dashboard".to_string(),
        Step::Signup(step) => match step {
            SignupStep::Phone => "/signup/phone".to_string(),
            SignupStep::PhoneOtp => "/signup/phone/otp".to_string(),
            SignupStep::Password => "/signup/password".to_string(),
            SignupStep::Aadhaar => "/signup/aadhaar".to_string(),
            SignupStep::AadhaarOtp => "/signup/aadhaar/otp".to_string(),
            SignupStep::Pin => "/signup/pin".to_string(),
            SignupStep::Signature(n) => format!("/signup/signature/{}", n),
            SignupStep::Done => "/signup/done".to_string(),
        },
        Step::EnterPin => "/enter-pin".to_string(),
        Step::SignDocument => "/sign-document".to_string(),
        Step::Outcome(TxStatus::Success) => "/result/success".to_string(),
        Step::Outcome(TxStatus::Failed) => "/result/failure".to_string(),
    }
}

/// 303 redirect to a workflow step
pub fn see_other(step: Step) -> Response {
    Redirect::to(&location(step)).into_response()
}

/// Create the portal router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health))
        // Login
        .route("/login", get(routes::login_page).post(routes::login))
        .route("/logout", get(routes::logout))
        // Signup wizard
        .route(
            "/signup/phone",
            get(routes::signup_phone_page).post(routes::signup_phone),
        )
        .route(
            "/signup/phone/otp",
            get(routes::signup_phone_otp_page).post(routes::signup_phone_otp),
        )
        .route(
            "/signup/password",
            get(routes::signup_password_page).post(routes::signup_password),
        )
        .route(
            "/signup/aadhaar",
            get(routes::signup_aadhaar_page).post(routes::signup_aadhaar),
        )
        .route(
            "/signup/aadhaar/otp",
            get(routes::signup_aadhaar_otp_page).post(routes::signup_aadhaar_otp),
        )
        .route(
            "/signup/pin",
            get(routes::signup_pin_page).post(routes::signup_pin),
        )
        .route(
            "/signup/signature/:step",
            get(routes::signup_signature_page).post(routes::signup_signature),
        )
        .route("/signup/done", get(routes::signup_done))
        // Filing and signing
        .route("/dashboard", get(routes::dashboard))
        .route(
            "/file/vehicle",
            get(routes::vehicle_form).post(routes::file_vehicle),
        )
        .route(
            "/file/property",
            get(routes::property_form).post(routes::file_property),
        )
        .route("/enter-pin", get(routes::enter_pin_page).post(routes::enter_pin))
        .route(
            "/sign-document",
            get(routes::sign_document_page).post(routes::sign_document),
        )
        .route("/result/success", get(routes::result_success))
        .route("/result/failure", get(routes::result_failure))
        .route("/download/:doc_id", get(routes::download))
        .layer(middleware::from_fn_with_state(state.clone(), session_layer))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Resolve or start the visitor's session and keep the cookie in sync
async fn session_layer(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Response {
    let cookie_name = state.config.session.cookie_name.clone();

    let existing = read_cookie(request.headers(), &cookie_name)
        .filter(|session_id| state.sessions.validate(session_id));
    let (session_id, fresh) = match existing {
        Some(session_id) => (session_id, false),
        None => (state.sessions.create(), true),
    };
    request.extensions_mut().insert(SessionId(session_id.clone()));

    let mut response = next.run(request).await;

    let issue = match response.extensions_mut().remove::<SessionId>() {
        Some(SessionId(rotated)) => Some(rotated),
        None if fresh => Some(session_id),
        None => None,
    };
    if let Some(session_id) = issue {
        let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", cookie_name, session_id);
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => warn!(error = %e, "Could not encode session cookie"),
        }
    }

    response
}

fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_cookie() {
        let mut headers = HeaderMap::new();
        headers.append(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; edoc_session=sess_abc"),
        );
        headers.append(header::COOKIE, HeaderValue::from_static("other=1"));

        assert_eq!(
            read_cookie(&headers, "edoc_session").as_deref(),
            Some("sess_abc")
        );
        assert_eq!(read_cookie(&headers, "other").as_deref(), Some("1"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_locations() {
        assert_eq!(location(Step::Signup(SignupStep::Signature(2))), "/signup/signature/2");
        assert_eq!(location(Step::Signup(SignupStep::AadhaarOtp)), "/signup/aadhaar/otp");
        assert_eq!(location(Step::Outcome(TxStatus::Failed)), "/result/failure");
        assert_eq!(location(Step::EnterPin), "/enter-pin");
    }
}
