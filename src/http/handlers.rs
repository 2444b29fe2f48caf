//! Route handlers: homepage form and not-found responder.

use std::net::SocketAddr;

use axum::{
    extract::{rejection::FormRejection, ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};

use crate::http::render::{self, FormView};
use crate::http::request::{client_ip, RequestIdExt};
use crate::http::response::{self, NOT_FOUND_BODY};
use crate::http::server::AppState;
use crate::lead::{ContactSubmission, SubmitError};

/// GET /: blank contact form.
pub async fn show_form(State(state): State<AppState>) -> Html<String> {
    let view = FormView::blank(state.recaptcha_site_key.as_deref());
    Html(render::homepage(&view).into_string())
}

/// POST /: validate and capture a lead, then re-render the page.
pub async fn submit_form(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Response {
    let request_id = headers.request_id();
    let submission = match form {
        Ok(Form(pairs)) => ContactSubmission::from_pairs(pairs),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return rejection.into_response();
        }
        Err(rejection) => {
            tracing::debug!(request_id = %request_id, rejection = %rejection, "Unreadable form body");
            ContactSubmission::default()
        }
    };
    let ip = client_ip(&headers, peer, state.trust_proxy_headers);
    let site_key = state.recaptcha_site_key.as_deref();

    match state.service.submit(&submission, Some(ip)).await {
        Ok(lead) => {
            tracing::info!(request_id = %request_id, lead_id = %lead.id, "Lead captured");
            let view = FormView::sent(site_key);
            (StatusCode::OK, Html(render::homepage(&view).into_string())).into_response()
        }
        Err(err) => {
            log_failure(request_id, &err);
            let (status, non_field) = response::failure(&err);
            let field_errors = match &err {
                SubmitError::Invalid(errors) => Some(errors),
                _ => None,
            };
            let view = FormView::rejected(&submission, field_errors, non_field, site_key);
            (status, Html(render::homepage(&view).into_string())).into_response()
        }
    }
}

fn log_failure(request_id: &str, err: &SubmitError) {
    match err {
        SubmitError::Invalid(errors) => {
            tracing::debug!(request_id = %request_id, errors = ?errors.codes(), "Submission rejected");
        }
        SubmitError::Captcha(e) if !e.is_transient() => {
            tracing::info!(request_id = %request_id, kind = e.kind(), error = %e, "Captcha rejected");
        }
        SubmitError::Captcha(e) => {
            tracing::warn!(
                request_id = %request_id,
                kind = e.kind(),
                error = %e,
                "Captcha verification unavailable"
            );
        }
        SubmitError::Storage(e) if e.is_transient() => {
            tracing::warn!(request_id = %request_id, kind = e.kind(), error = %e, "Lead not stored");
        }
        SubmitError::Storage(e) => {
            tracing::error!(request_id = %request_id, kind = e.kind(), error = %e, "Lead not stored");
        }
    }
}

/// Fallback for unmatched routes.
pub async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, NOT_FOUND_BODY)
}
