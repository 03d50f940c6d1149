/**
 * Page Routes
 * Slug lookup for flat pages, plus the not-found fallback
 */
use axum::{
    extract::{Path, State},
    http::{Method, StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::error::PageError;
use crate::flash::IncomingFlash;
use crate::forms::is_valid_slug;
use crate::views;
use crate::AppState;

/// GET /{slug}/ - registered as a parameterized route, so every literal route wins
pub async fn render_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    flash: IncomingFlash,
) -> Result<Response, PageError> {
    if !is_valid_slug(&slug) {
        return Err(PageError::NotFound);
    }

    let page = state
        .store
        .find_page_by_slug(&slug)
        .await?
        .ok_or(PageError::NotFound)?;

    let body = views::pages::render(&state.config.site_name, flash.notice(), &page);
    Ok(flash.respond(StatusCode::OK, body))
}

/// Slash-appended target for a local path, or `None` when the path could be read
/// as another host (`//host`, `/\host`) or already ends in a slash.
fn slash_redirect_target(uri: &Uri) -> Option<String> {
    let path = uri.path();
    let rest = path.strip_prefix('/')?;
    if rest.is_empty() || rest.starts_with(['/', '\\']) || path.ends_with('/') {
        return None;
    }
    Some(match uri.query() {
        Some(q) => format!("{}/?{}", path, q),
        None => format!("{}/", path),
    })
}

/// Anything no route matched. Slash-less GETs are retried with a trailing slash,
/// everything else is a 404 page.
pub async fn fallback(method: Method, uri: Uri) -> Response {
    if method == Method::GET || method == Method::HEAD {
        if let Some(target) = slash_redirect_target(&uri) {
            return Redirect::permanent(&target).into_response();
        }
    }
    (
        StatusCode::NOT_FOUND,
        Html(views::not_found().into_string()),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(uri: &str) -> Option<String> {
        slash_redirect_target(&uri.parse().unwrap())
    }

    #[test]
    fn test_slash_redirect_keeps_query() {
        assert_eq!(target("/youth"), Some("/youth/".to_string()));
        assert_eq!(target("/youth?week=2"), Some("/youth/?week=2".to_string()));
    }

    #[test]
    fn test_no_slash_redirect_to_other_hosts() {
        assert_eq!(target("//evil.example"), None);
        assert_eq!(target("//evil.example/path"), None);
        assert_eq!(target("/%5Cevil.example"), Some("/%5Cevil.example/".to_string()));
        assert_eq!(target("/youth/"), None);
    }
}
