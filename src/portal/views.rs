//! HTML pages
//!
//! Plain server-rendered markup: one shell with the flash notices, and a
//! small form per step. All user-supplied text goes through [`escape`].

use axum::response::Html;

use super::location;
use crate::account::{Account, TxStatus};
use crate::workflow::filing::CurrentDocument;
use crate::workflow::signup::{SignupState, SignupStep, SIGNATURE_SAMPLES};
use crate::workflow::{Notice, Step};

const STYLE: &str = "body{font-family:sans-serif;max-width:40rem;margin:2rem auto;padding:0 1rem}\
.notice{padding:.5rem 1rem;margin:.5rem 0;border-radius:4px}\
.notice-success{background:#e6f4ea}.notice-info{background:#e8f0fe}.notice-error{background:#fce8e6}\
label{display:block;margin:.75rem 0 .25rem}input,textarea{width:100%;padding:.4rem}\
button{margin-top:1rem;padding:.5rem 1.5rem}table{width:100%;border-collapse:collapse}\
td,th{border-bottom:1px solid #ddd;padding:.4rem;text-align:left}";

/// Escape text for use in HTML content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, notices: &[Notice], body: &str) -> Html<String> {
    let mut html = String::with_capacity(1024 + body.len());
    html.push_str("<!doctype html><html><head><meta charset=\"utf-8\"><title>");
    html.push_str(&escape(title));
    html.push_str(" - E-Doc Transfer</title><style>");
    html.push_str(STYLE);
    html.push_str("</style></head><body><h1>");
    html.push_str(&escape(title));
    html.push_str("</h1>");
    for notice in notices {
        html.push_str("<div class=\"notice notice-");
        html.push_str(notice.level.as_str());
        html.push_str("\">");
        html.push_str(&escape(&notice.message));
        html.push_str("</div>");
    }
    html.push_str(body);
    html.push_str("</body></html>");
    Html(html)
}

struct Field<'a> {
    name: &'a str,
    label: &'a str,
    kind: &'a str,
}

const fn field<'a>(name: &'a str, label: &'a str, kind: &'a str) -> Field<'a> {
    Field { name, label, kind }
}

fn form(action: &str, fields: &[Field<'_>], submit: &str) -> String {
    let mut html = format!("<form method=\"post\" action=\"{}\">", action);
    for f in fields {
        html.push_str(&format!("<label for=\"{0}\">{1}</label>", f.name, escape(f.label)));
        if f.kind == "textarea" {
            html.push_str(&format!(
                "<textarea id=\"{0}\" name=\"{0}\" rows=\"4\" required></textarea>",
                f.name
            ));
        } else {
            html.push_str(&format!(
                "<input id=\"{0}\" name=\"{0}\" type=\"{1}\" required>",
                f.name, f.kind
            ));
        }
    }
    html.push_str(&format!("<button type=\"submit\">{}</button></form>", escape(submit)));
    html
}

pub fn login(notices: &[Notice]) -> Html<String> {
    let body = format!(
        "{}<p>New here? <a href=\"{}\">Create an account</a></p>",
        form(
            &location(Step::Login),
            &[
                field("mobile", "Mobile number", "tel"),
                field("password", "Password", "password"),
            ],
            "Sign in",
        ),
        location(Step::Signup(SignupStep::Phone))
    );
    page("Sign in", notices, &body)
}

/// One page per wizard step
pub fn signup(
    step: SignupStep,
    progress: Option<&SignupState>,
    demo_otp: &str,
    notices: &[Notice],
) -> Html<String> {
    let here = location(Step::Signup(step));
    let here = here.as_str();
    let (title, body) = match step {
        SignupStep::Phone => (
            "Sign up".to_string(),
            form(here, &[field("mobile", "Mobile number", "tel")], "Send OTP"),
        ),
        SignupStep::PhoneOtp => (
            "Verify mobile".to_string(),
            format!(
                "<p>Enter the code sent to {} (demo code {}).</p>{}",
                escape(progress.map(|p| p.mobile()).unwrap_or_default()),
                escape(demo_otp),
                form(here, &[field("otp", "OTP", "text")], "Verify")
            ),
        ),
        SignupStep::Password => (
            "Choose a password".to_string(),
            form(here, &[field("password", "Password", "password")], "Continue"),
        ),
        SignupStep::Aadhaar => (
            "Aadhaar number".to_string(),
            form(here, &[field("aadhaar", "12-digit Aadhaar number", "text")], "Send OTP"),
        ),
        SignupStep::AadhaarOtp => (
            "Verify Aadhaar".to_string(),
            format!(
                "<p>Enter the code sent for Aadhaar {} (demo code {}).</p>{}",
                escape(progress.and_then(|p| p.aadhaar()).unwrap_or_default()),
                escape(demo_otp),
                form(here, &[field("otp", "OTP", "text")], "Verify")
            ),
        ),
        SignupStep::Pin => (
            "Transfer PIN".to_string(),
            form(here, &[field("pin", "6-digit transfer PIN", "password")], "Continue"),
        ),
        SignupStep::Signature(n) => (
            format!("Signature {} of {}", n, SIGNATURE_SAMPLES),
            form(
                here,
                &[field("signature_data", "Draw or type your signature", "textarea")],
                "Save signature",
            ),
        ),
        SignupStep::Done => (
            "All set".to_string(),
            format!(
                "<p>Your account is ready.</p><p><a href=\"{}\">Sign in</a></p>",
                location(Step::Login)
            ),
        ),
    };
    page(&title, notices, &body)
}

pub fn dashboard(account: &Account, notices: &[Notice]) -> Html<String> {
    let mut body = format!(
        "<p>Signed in as {}. <a href=\"/logout\">Log out</a></p>\
         <h2>New transfer</h2><ul>\
         <li><a href=\"/file/vehicle\">Vehicle transfer</a></li>\
         <li><a href=\"/file/property\">Property transfer</a></li></ul>\
         <h2>History</h2>",
        escape(&account.mobile)
    );

    if account.history.is_empty() {
        body.push_str("<p>No transfers yet.</p>");
    } else {
        body.push_str(
            "<table><tr><th>#</th><th>Type</th><th>Status</th><th>Details</th><th>Date</th><th></th></tr>",
        );
        for record in &account.history {
            body.push_str(&format!(
                "<tr><td>{id}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
                 <td><a href=\"/download/{id}\">Download</a></td></tr>",
                record.file_type,
                record.status,
                escape(&record.details),
                record.created_at.format("%Y-%m-%d %H:%M UTC"),
                id = record.id,
            ));
        }
        body.push_str("</table>");
    }

    page("Dashboard", notices, &body)
}

pub fn vehicle_form(notices: &[Notice]) -> Html<String> {
    let body = form(
        "/file/vehicle",
        &[
            field("owner_name", "Current owner", "text"),
            field("reg_number", "Registration number", "text"),
            field("to_name", "Transfer to", "text"),
        ],
        "Continue",
    );
    page("Vehicle transfer", notices, &body)
}

pub fn property_form(notices: &[Notice]) -> Html<String> {
    let body = form(
        "/file/property",
        &[
            field("owner_name", "Current owner", "text"),
            field("property_id", "Property id", "text"),
            field("to_name", "Transfer to", "text"),
        ],
        "Continue",
    );
    page("Property transfer", notices, &body)
}

pub fn enter_pin(doc: &CurrentDocument, notices: &[Notice]) -> Html<String> {
    let body = format!(
        "<p>{}</p>{}",
        escape(&doc.details),
        form(
            &location(Step::EnterPin),
            &[field("pin", "Transfer PIN", "password")],
            "Authorize"
        )
    );
    page("Enter transfer PIN", notices, &body)
}

pub fn sign_document(doc: &CurrentDocument, notices: &[Notice]) -> Html<String> {
    let body = format!(
        "<p>{}</p>{}",
        escape(&doc.details),
        form(
            &location(Step::SignDocument),
            &[field("signature_data", "Signature", "textarea")],
            "Sign"
        )
    );
    page("Sign document", notices, &body)
}

pub fn result_success(doc_id: u64, notices: &[Notice]) -> Html<String> {
    let body = format!(
        "<p>Transfer #{0} is complete.</p>\
         <p><a href=\"/download/{0}\">Download copy</a> | <a href=\"{1}\">Back to dashboard</a></p>",
        doc_id,
        location(Step::Dashboard)
    );
    page(title_for(TxStatus::Success), notices, &body)
}

pub fn result_failure(notices: &[Notice]) -> Html<String> {
    let body = format!(
        "<p>The transfer was recorded as failed.</p><p><a href=\"{}\">Back to dashboard</a></p>",
        location(Step::Dashboard)
    );
    page(title_for(TxStatus::Failed), notices, &body)
}

fn title_for(status: TxStatus) -> &'static str {
    match status {
        TxStatus::Success => "Transfer signed",
        TxStatus::Failed => "Transfer failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape("<b>\"Tom\" & 'Jerry'</b>"),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_notices_are_rendered_escaped() {
        let Html(html) = login(&[Notice::error("<script>")]);
        assert!(html.contains("notice-error"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_signature_page_posts_to_its_step() {
        let Html(html) = signup(SignupStep::Signature(2), None, "123456", &[]);
        assert!(html.contains("action=\"/signup/signature/2\""));
        assert!(html.contains("Signature 2 of 3"));
    }
}
