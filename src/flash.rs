//! One-shot notices carried across a redirect in a short-lived cookie.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use maud::Markup;
use std::convert::Infallible;

const COOKIE_NAME: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Level::Success),
            "info" => Some(Level::Info),
            "warning" => Some(Level::Warning),
            "error" => Some(Level::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub message: String,
}

impl Notice {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    fn encode(&self) -> String {
        urlencoding::encode(&format!("{}|{}", self.level.as_str(), self.message)).into_owned()
    }

    fn decode(raw: &str) -> Option<Self> {
        let decoded = urlencoding::decode(raw).ok()?;
        let (level, message) = decoded.split_once('|')?;
        Some(Self::new(Level::parse(level)?, message))
    }
}

fn cookie(value: &str, max_age: u32, secure: bool) -> Option<HeaderValue> {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        COOKIE_NAME, value, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).ok()
}

/// 303 redirect that leaves `notice` for the next page render.
pub fn redirect_with(to: &str, notice: Notice, secure: bool) -> Response {
    let mut response = Redirect::to(to).into_response();
    if let Some(value) = cookie(&notice.encode(), 60, secure) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

/// The notice left by the previous response, if any.
#[derive(Debug, Default, Clone)]
pub struct IncomingFlash(Option<Notice>);

impl IncomingFlash {
    pub fn notice(&self) -> Option<&Notice> {
        self.0.as_ref()
    }

    /// Render `body`, consuming the pending notice so it shows exactly once.
    pub fn respond(&self, status: StatusCode, body: Markup) -> Response {
        let mut response = (status, Html(body.into_string())).into_response();
        if self.0.is_some() {
            if let Some(value) = cookie("", 0, false) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }
        response
    }
}

impl<S: Send + Sync> FromRequestParts<S> for IncomingFlash {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let notice = parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == COOKIE_NAME)
            .and_then(|(_, value)| Notice::decode(value));
        Ok(Self(notice))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(cookie_header: &str) -> IncomingFlash {
        let (mut parts, _) = Request::get("/")
            .header(header::COOKIE, cookie_header)
            .body(())
            .unwrap()
            .into_parts();
        IncomingFlash::from_request_parts(&mut parts, &())
            .await
            .unwrap()
    }

    #[test]
    fn test_redirect_sets_cookie_and_location() {
        let res = redirect_with("/", Notice::new(Level::Warning, "Already here; hi"), true);
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/");
        let set = res.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set.starts_with("flash=warning%7CAlready%20here%3B%20hi"));
        assert!(set.ends_with("; Secure"));
    }

    #[tokio::test]
    async fn test_extractor_reads_encoded_notice() {
        let flash = extract("theme=dark; flash=success%7CThank%20you").await;
        assert_eq!(
            flash.notice(),
            Some(&Notice::new(Level::Success, "Thank you"))
        );
    }

    #[tokio::test]
    async fn test_extractor_ignores_garbage() {
        assert!(extract("flash=nonsense").await.notice().is_none());
        assert!(extract("flash=shout%7Chello").await.notice().is_none());
    }

    #[tokio::test]
    async fn test_respond_clears_consumed_notice() {
        let flash = extract("flash=info%7Chello").await;
        let res = flash.respond(StatusCode::OK, maud::html! { p { "x" } });
        let set = res.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set.contains("Max-Age=0"));

        let res = IncomingFlash::default().respond(StatusCode::OK, maud::html! { p { "x" } });
        assert!(res.headers().get(header::SET_COOKIE).is_none());
    }
}
