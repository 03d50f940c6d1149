/**
 * Contact Routes
 * Contact form display and submission
 */
use axum::{
    extract::{rejection::FormRejection, ConnectInfo, State},
    http::StatusCode,
    response::Response,
    Form,
};
use std::net::SocketAddr;

use crate::error::PageError;
use crate::flash::{redirect_with, IncomingFlash, Level, Notice};
use crate::forms::{ContactForm, FieldErrors};
use crate::views;
use crate::AppState;

const SENT: &str = "Your message has been sent. We will get back to you soon.";
const THROTTLED: &str = "Too many messages from your address. Please try again later.";

/// GET /contact/
pub async fn show_contact(State(state): State<AppState>, flash: IncomingFlash) -> Response {
    let body = views::contact::contact(
        &state.config.site_name,
        flash.notice(),
        &ContactForm::default(),
        &FieldErrors::default(),
    );
    flash.respond(StatusCode::OK, body)
}

/// POST /contact/
///
/// Invalid input re-renders the form with 422 and nothing is stored. A valid
/// message is saved and the client is sent back to the form with a notice.
pub async fn submit_contact(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    flash: IncomingFlash,
    form: Result<Form<ContactForm>, FormRejection>,
) -> Result<Response, PageError> {
    let site = &state.config.site_name;

    // An undecodable body is treated like an empty submission.
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "contact form body rejected");
            ContactForm::default()
        }
    };

    let message = match form.validate() {
        Ok(message) => message,
        Err(errors) => {
            tracing::info!(
                fields = errors.len(),
                "contact form rejected by validation"
            );
            let body = views::contact::contact(site, flash.notice(), &form, &errors);
            return Ok(flash.respond(StatusCode::UNPROCESSABLE_ENTITY, body));
        }
    };

    if !state.contact_limiter.check(addr.ip()).await {
        tracing::warn!(ip = %addr.ip(), "contact form rate limited");
        let notice = Notice::new(Level::Error, THROTTLED);
        let body = views::contact::contact(site, Some(&notice), &form, &FieldErrors::default());
        return Ok(flash.respond(StatusCode::TOO_MANY_REQUESTS, body));
    }

    let saved = state.store.insert_contact_message(message).await?;
    tracing::info!(id = saved.id, "contact message received");

    Ok(redirect_with(
        "/contact/",
        Notice::new(Level::Success, SENT),
        state.config.cookie_secure,
    ))
}
