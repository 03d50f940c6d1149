/**
 * Newsletter Routes
 * Email subscription from the site-wide footer form
 */
use axum::{
    extract::{rejection::FormRejection, State},
    response::Response,
    Form,
};

use crate::db::SiteStore;
use crate::flash::{redirect_with, Level, Notice};
use crate::forms::SubscribeForm;
use crate::AppState;

/// What happened to a subscription attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Subscribed,
    AlreadySubscribed,
    InvalidEmail,
    StoreFailure,
}

impl SubscribeOutcome {
    pub fn notice(&self) -> Notice {
        match self {
            SubscribeOutcome::Subscribed => Notice::new(
                Level::Success,
                "Thank you for subscribing to our newsletter!",
            ),
            SubscribeOutcome::AlreadySubscribed => Notice::new(
                Level::Warning,
                "You are already subscribed to our newsletter.",
            ),
            SubscribeOutcome::InvalidEmail => {
                Notice::new(Level::Error, "Please enter a valid email address.")
            }
            SubscribeOutcome::StoreFailure => Notice::new(
                Level::Error,
                "We could not complete your subscription. Please try again later.",
            ),
        }
    }
}

/// Record a subscription, at most once per address.
pub async fn subscribe_email(store: &dyn SiteStore, form: &SubscribeForm) -> SubscribeOutcome {
    let Some(email) = form.valid_email() else {
        return SubscribeOutcome::InvalidEmail;
    };

    match store.find_subscription(&email).await {
        Ok(Some(_)) => return SubscribeOutcome::AlreadySubscribed,
        Ok(None) => {}
        Err(e) => {
            tracing::error!(error = %e, "subscription lookup failed");
            return SubscribeOutcome::StoreFailure;
        }
    }

    match store.insert_subscription(&email).await {
        Ok(sub) => {
            tracing::info!(id = sub.id, "newsletter subscription created");
            SubscribeOutcome::Subscribed
        }
        // Lost a race with a concurrent request for the same address.
        Err(e) if e.is_conflict() => SubscribeOutcome::AlreadySubscribed,
        Err(e) => {
            tracing::error!(error = %e, "subscription insert failed");
            SubscribeOutcome::StoreFailure
        }
    }
}

/// POST /subscribe/ - always lands back on the home page with a notice
pub async fn subscribe(
    State(state): State<AppState>,
    form: Result<Form<SubscribeForm>, FormRejection>,
) -> Response {
    let form = form.map(|Form(f)| f).unwrap_or_default();
    let outcome = subscribe_email(state.store.as_ref(), &form).await;
    redirect_with("/", outcome.notice(), state.config.cookie_secure)
}
