/**
 * Site Routes
 * Home listing and the static informational pages
 */
use axum::{extract::State, http::StatusCode, response::Response};

use crate::error::PageError;
use crate::flash::IncomingFlash;
use crate::views::{
    self,
    site::{AboutContext, HomeContext},
};
use crate::AppState;

const HOME_TESTIMONIALS: i64 = 3;
const HOME_VIDEOS: i64 = 3;
const HOME_NEWS: i64 = 3;

/// GET / - carousel, videos, news and testimonials
pub async fn home(
    State(state): State<AppState>,
    flash: IncomingFlash,
) -> Result<Response, PageError> {
    let testimonials = state.store.testimonials(HOME_TESTIMONIALS).await?;
    let videos = state.store.videos(HOME_VIDEOS).await?;
    let news = state.store.latest_news(HOME_NEWS).await?;
    let slides = state
        .store
        .carousel_slides(state.config.carousel_limit)
        .await?;

    if let Some(limit) = state.config.carousel_limit {
        if slides.len() as i64 >= limit {
            tracing::debug!(limit, "carousel listing reached its configured cap");
        }
    }

    let ctx = HomeContext {
        testimonials: &testimonials,
        videos: &videos,
        slides: &slides,
        news: &news,
    };
    let body = views::site::home(&state.config.site_name, flash.notice(), &ctx);
    Ok(flash.respond(StatusCode::OK, body))
}

/// GET /about-us/ - static copy plus the team, locations and social links
pub async fn about_us(
    State(state): State<AppState>,
    flash: IncomingFlash,
) -> Result<Response, PageError> {
    let team = state.store.team_members().await?;
    let locations = state.store.locations().await?;
    let social_links = state.store.social_links().await?;

    let ctx = AboutContext {
        team: &team,
        locations: &locations,
        social_links: &social_links,
    };
    let body = views::site::about(&state.config.site_name, flash.notice(), &ctx);
    Ok(flash.respond(StatusCode::OK, body))
}

/// GET /mission/
pub async fn mission(State(state): State<AppState>, flash: IncomingFlash) -> Response {
    let body = views::site::mission(&state.config.site_name, flash.notice());
    flash.respond(StatusCode::OK, body)
}
