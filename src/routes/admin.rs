/**
 * Admin Content API
 * Authenticated creation and listing endpoints for site content
 */
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::accounts::Capability;
use crate::db::models::*;
use crate::db::repository::display_order;
use crate::forms::{is_valid_email, validate_page_slug};
use crate::routes::auth::authorize;
use crate::routes::{api_error, store_api_error, ApiError};
use crate::AppState;

type Created<T> = Result<(StatusCode, Json<T>), ApiError>;

const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 500;

// Column widths from the schema in `db::SCHEMA`.
const LONG_TITLE_LEN: usize = 255;
const TITLE_LEN: usize = 200;
const NAME_LEN: usize = 100;
const ADDRESS_LEN: usize = 255;
const SOCIAL_URL_LEN: usize = 200;
const ICON_CLASS_LEN: usize = 100;
const PHONE_LEN: usize = 15;

/// Strip scripts, event handlers and other unsafe markup from rich-text content.
pub fn sanitize_html(content: &str) -> String {
    ammonia::clean(content)
}

fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("{} is required", field),
        ));
    }
    Ok(())
}

fn max_len(field: &str, value: &str, max: usize) -> Result<(), ApiError> {
    if value.chars().count() > max {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("{} must be at most {} characters", field, max),
        ));
    }
    Ok(())
}

fn require_url(field: &str, value: &str) -> Result<(), ApiError> {
    require(field, value)?;
    if !(value.starts_with("https://") || value.starts_with("http://")) {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("{} must be an http(s) URL", field),
        ));
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

impl ListQuery {
    fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        let total = items.len();
        Self { items, total }
    }
}

// ============================================================================
// Blog & events
// ============================================================================

/// The author of a post is always the caller.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostRequest {
    pub title: String,
    pub content: String,
    pub image: String,
    pub published_at: Option<DateTime<Utc>>,
}

/// POST /api/admin/blog-posts
pub async fn create_blog_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<BlogPostRequest>,
) -> Created<BlogPost> {
    let author = authorize(&state, &headers, Capability::PublishBlog).await?;
    require("title", &payload.title)?;
    max_len("title", &payload.title, LONG_TITLE_LEN)?;
    require("content", &payload.content)?;
    require("image", &payload.image)?;

    let post = state
        .store
        .insert_blog_post(NewBlogPost {
            title: payload.title.trim().to_string(),
            content: sanitize_html(&payload.content),
            author_id: author.id,
            published_at: payload.published_at,
            image: payload.image,
        })
        .await
        .map_err(store_api_error)?;

    tracing::info!(id = post.id, author = author.id, "blog post created");
    Ok((StatusCode::CREATED, Json(post)))
}

/// POST /api/admin/events
pub async fn create_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<NewEvent>,
) -> Created<Event> {
    let account = authorize(&state, &headers, Capability::UploadEvents).await?;
    require("title", &payload.title)?;
    max_len("title", &payload.title, LONG_TITLE_LEN)?;
    require("location", &payload.location)?;
    max_len("location", &payload.location, ADDRESS_LEN)?;

    let event = state
        .store
        .insert_event(payload)
        .await
        .map_err(store_api_error)?;

    tracing::info!(id = event.id, account = account.id, "event created");
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /api/admin/events
pub async fn list_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse<Event>>, ApiError> {
    authorize(&state, &headers, Capability::UploadEvents).await?;
    let events = state
        .store
        .list_events(query.limit())
        .await
        .map_err(store_api_error)?;
    Ok(Json(events.into()))
}

// ============================================================================
// Home page content
// ============================================================================

/// POST /api/admin/carousel
pub async fn create_slide(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<NewCarouselSlide>,
) -> Created<CarouselSlide> {
    authorize(&state, &headers, Capability::ManageContent).await?;
    require("title", &payload.title)?;
    max_len("title", &payload.title, LONG_TITLE_LEN)?;
    require("image", &payload.image)?;
    display_order(&payload).map_err(store_api_error)?;

    let slide = state
        .store
        .insert_slide(payload)
        .await
        .map_err(store_api_error)?;
    Ok((StatusCode::CREATED, Json(slide)))
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialRequest {
    pub name: String,
    pub content: String,
    pub company: Option<String>,
    pub position: Option<String>,
    pub photo: Option<String>,
    /// Defaults to today.
    pub date: Option<NaiveDate>,
}

/// POST /api/admin/testimonials
pub async fn create_testimonial(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<TestimonialRequest>,
) -> Created<Testimonial> {
    authorize(&state, &headers, Capability::ManageContent).await?;
    require("name", &payload.name)?;
    max_len("name", &payload.name, NAME_LEN)?;
    require("content", &payload.content)?;
    if let Some(company) = payload.company.as_deref() {
        max_len("company", company, NAME_LEN)?;
    }
    if let Some(position) = payload.position.as_deref() {
        max_len("position", position, NAME_LEN)?;
    }

    let testimonial = state
        .store
        .insert_testimonial(NewTestimonial {
            name: payload.name,
            content: payload.content,
            company: payload.company,
            position: payload.position,
            photo: payload.photo,
            date: payload.date.unwrap_or_else(|| Utc::now().date_naive()),
        })
        .await
        .map_err(store_api_error)?;
    Ok((StatusCode::CREATED, Json(testimonial)))
}

/// POST /api/admin/videos
pub async fn create_video(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<NewVideo>,
) -> Created<Video> {
    authorize(&state, &headers, Capability::ManageContent).await?;
    require("title", &payload.title)?;
    max_len("title", &payload.title, TITLE_LEN)?;
    require_url("videoUrl", &payload.video_url)?;
    require("thumbnail", &payload.thumbnail)?;

    let video = state
        .store
        .insert_video(payload)
        .await
        .map_err(store_api_error)?;
    Ok((StatusCode::CREATED, Json(video)))
}

// ============================================================================
// Church information
// ============================================================================

/// POST /api/admin/team-members
pub async fn create_team_member(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut payload): Json<NewTeamMember>,
) -> Created<TeamMember> {
    authorize(&state, &headers, Capability::ManageContent).await?;
    require("name", &payload.name)?;
    max_len("name", &payload.name, NAME_LEN)?;
    require("photo", &payload.photo)?;
    if let Some(phone) = payload.phone_number.as_deref() {
        max_len("phoneNumber", phone, PHONE_LEN)?;
    }
    if let Some(email) = payload.email.as_deref() {
        if !is_valid_email(email.trim()) {
            return Err(api_error(StatusCode::BAD_REQUEST, "Invalid email format"));
        }
    }
    payload.email = payload
        .email
        .as_deref()
        .map(crate::accounts::normalize_email);

    let member = state
        .store
        .insert_team_member(payload)
        .await
        .map_err(store_api_error)?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// POST /api/admin/news
pub async fn create_news(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut payload): Json<NewChurchNews>,
) -> Created<ChurchNews> {
    authorize(&state, &headers, Capability::ManageContent).await?;
    require("title", &payload.title)?;
    max_len("title", &payload.title, TITLE_LEN)?;
    require("author", &payload.author)?;
    max_len("author", &payload.author, NAME_LEN)?;
    payload.content = sanitize_html(&payload.content);

    let news = state
        .store
        .insert_news(payload)
        .await
        .map_err(store_api_error)?;
    Ok((StatusCode::CREATED, Json(news)))
}

/// POST /api/admin/pages
pub async fn create_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut payload): Json<NewPage>,
) -> Created<Page> {
    authorize(&state, &headers, Capability::ManageContent).await?;
    require("title", &payload.title)?;
    max_len("title", &payload.title, TITLE_LEN)?;
    validate_page_slug(&payload.slug).map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?;
    payload.content = sanitize_html(&payload.content);

    let page = state
        .store
        .insert_page(payload)
        .await
        .map_err(store_api_error)?;

    tracing::info!(id = page.id, slug = %page.slug, "page created");
    Ok((StatusCode::CREATED, Json(page)))
}

/// POST /api/admin/social-links
pub async fn create_social_link(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<NewSocialMediaLink>,
) -> Created<SocialMediaLink> {
    authorize(&state, &headers, Capability::ManageContent).await?;
    require_url("url", &payload.url)?;
    max_len("url", &payload.url, SOCIAL_URL_LEN)?;
    max_len("iconClass", &payload.icon_class, ICON_CLASS_LEN)?;

    let link = state
        .store
        .insert_social_link(payload)
        .await
        .map_err(store_api_error)?;
    Ok((StatusCode::CREATED, Json(link)))
}

/// POST /api/admin/locations
pub async fn create_location(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<NewGeographicLocation>,
) -> Created<GeographicLocation> {
    authorize(&state, &headers, Capability::ManageContent).await?;
    require("address", &payload.address)?;
    max_len("address", &payload.address, ADDRESS_LEN)?;
    if !(-90.0..=90.0).contains(&payload.latitude) || !(-180.0..=180.0).contains(&payload.longitude)
    {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Coordinates are out of range",
        ));
    }

    let location = state
        .store
        .insert_location(payload)
        .await
        .map_err(store_api_error)?;
    Ok((StatusCode::CREATED, Json(location)))
}

// ============================================================================
// Inbox
// ============================================================================

/// GET /api/admin/messages
pub async fn list_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse<ContactMessage>>, ApiError> {
    authorize(&state, &headers, Capability::ReadInbox).await?;
    let messages = state
        .store
        .contact_messages(query.limit())
        .await
        .map_err(store_api_error)?;
    Ok(Json(messages.into()))
}

/// GET /api/admin/subscriptions
pub async fn list_subscriptions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse<NewsletterSubscription>>, ApiError> {
    authorize(&state, &headers, Capability::ReadInbox).await?;
    let subscriptions = state
        .store
        .subscriptions(query.limit())
        .await
        .map_err(store_api_error)?;
    Ok(Json(subscriptions.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_html_strips_scripts() {
        let cleaned = sanitize_html("<p onclick=\"x()\">Hi</p><script>alert(1)</script>");
        assert_eq!(cleaned, "<p>Hi</p>");
    }

    #[test]
    fn test_list_limit_is_clamped() {
        assert_eq!(ListQuery { limit: None }.limit(), DEFAULT_LIST_LIMIT);
        assert_eq!(ListQuery { limit: Some(0) }.limit(), 1);
        assert_eq!(ListQuery { limit: Some(10_000) }.limit(), MAX_LIST_LIMIT);
    }

    #[test]
    fn test_validation_helpers() {
        assert!(require("title", "  ").is_err());
        assert!(max_len("name", "abcd", 3).is_err());
        assert!(require_url("url", "javascript:alert(1)").is_err());
        assert!(require_url("url", "https://facebook.com/grace").is_ok());
    }
}
