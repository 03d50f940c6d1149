/**
 * Blog Routes
 * Blog index (featured + recent) and post detail pages
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};

use crate::db::models::BlogPost;
use crate::error::PageError;
use crate::flash::IncomingFlash;
use crate::views;
use crate::AppState;

/// Posts listed under the featured one.
pub const RECENT_POSTS: usize = 5;

/// Split newest-first posts into the featured post and at most `RECENT_POSTS` others.
pub fn split_featured(mut posts: Vec<BlogPost>) -> (Option<BlogPost>, Vec<BlogPost>) {
    if posts.is_empty() {
        return (None, posts);
    }
    let featured = posts.remove(0);
    posts.truncate(RECENT_POSTS);
    (Some(featured), posts)
}

/// GET /blog/
pub async fn index(
    State(state): State<AppState>,
    flash: IncomingFlash,
) -> Result<Response, PageError> {
    let posts = state
        .store
        .recent_blog_posts(RECENT_POSTS as i64 + 1)
        .await?;
    let (featured, recent) = split_featured(posts);

    if featured.is_none() {
        tracing::debug!("blog index rendered with no posts");
    }

    let body = views::blog::index(
        &state.config.site_name,
        flash.notice(),
        featured.as_ref(),
        &recent,
    );
    Ok(flash.respond(StatusCode::OK, body))
}

/// GET /blog/{id}/
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    flash: IncomingFlash,
) -> Result<Response, PageError> {
    let id: i64 = id.parse().map_err(|_| PageError::NotFound)?;
    let post = state
        .store
        .get_blog_post(id)
        .await?
        .ok_or(PageError::NotFound)?;

    let body = views::blog::detail(&state.config.site_name, flash.notice(), &post);
    Ok(flash.respond(StatusCode::OK, body))
}
