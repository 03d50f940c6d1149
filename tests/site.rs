//! End-to-end tests: the full router over an in-memory store.

use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::{Duration, Utc};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

use church_site::config::SiteConfig;
use church_site::db::models::*;
use church_site::db::repository::*;
use church_site::db::MemoryStore;
use church_site::routes::auth::create_access_token;
use church_site::{create_app, AppState};

fn app_with(store: &Arc<MemoryStore>, config: SiteConfig) -> Router {
    let state = AppState::new(store.clone(), config);
    create_app(state).layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))))
}

fn app(store: &Arc<MemoryStore>) -> Router {
    app_with(store, SiteConfig::default())
}

async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_form(app: Router, uri: &str, body: &str) -> Response {
    let req = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(req).await.unwrap()
}

async fn post_json(app: Router, uri: &str, token: Option<&str>, json: serde_json::Value) -> Response {
    let mut req = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    app.oneshot(req.body(Body::from(json.to_string())).unwrap())
        .await
        .unwrap()
}

async fn body_text(res: Response) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn set_cookie(res: &Response) -> String {
    res.headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default()
}

async fn account(store: &MemoryStore, email: &str, new: NewAccount) -> Account {
    store
        .create_account(NewAccount {
            email: email.to_string(),
            password_hash: "unused".to_string(),
            ..new
        })
        .await
        .unwrap()
}

fn token_for(account: &Account) -> String {
    create_access_token(account, &SiteConfig::default().jwt_secret).unwrap()
}

async fn page(store: &MemoryStore, slug: &str, title: &str, page_type: PageType) {
    store
        .insert_page(NewPage {
            title: title.to_string(),
            slug: slug.to_string(),
            content: "<p>Welcome</p>".to_string(),
            image: None,
            page_type,
        })
        .await
        .unwrap();
}

// ============================================================================
// Pages and routing
// ============================================================================

#[tokio::test]
async fn unknown_and_malformed_slugs_are_404() {
    let store = Arc::new(MemoryStore::new());
    for uri in ["/no-such-page/", "/UPPER/", "/a--b/", "/blog/abc/", "/blog/999/"] {
        let res = get(app(&store), uri).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{}", uri);
        assert!(body_text(res).await.contains("Page not found"));
    }
}

#[tokio::test]
async fn page_renders_with_template_for_its_type() {
    let store = Arc::new(MemoryStore::new());
    page(&store, "outreach", "Outreach", PageType::Mission).await;

    let res = get(app(&store), "/outreach/").await;
    assert_eq!(res.status(), StatusCode::OK);
    let html = body_text(res).await;
    assert!(html.contains("page-mission"));
    assert!(html.contains("<title>Outreach | Grace Church</title>"));
}

#[tokio::test]
async fn fixed_routes_win_over_page_with_same_slug() {
    let store = Arc::new(MemoryStore::new());
    page(&store, "blog", "Shadow Blog", PageType::Base).await;
    page(&store, "mission", "Shadow Mission", PageType::Base).await;

    let html = body_text(get(app(&store), "/blog/").await).await;
    assert!(html.contains("empty-state"));
    assert!(!html.contains("Shadow Blog"));

    let html = body_text(get(app(&store), "/mission/").await).await;
    assert!(html.contains("Our Mission"));
    assert!(!html.contains("Shadow Mission"));
}

#[tokio::test]
async fn slashless_paths_redirect_permanently() {
    let store = Arc::new(MemoryStore::new());
    let res = get(app(&store), "/about-us").await;
    assert_eq!(res.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(res.headers()[header::LOCATION], "/about-us/");
}

#[tokio::test]
async fn protocol_relative_paths_are_not_redirected() {
    let store = Arc::new(MemoryStore::new());
    for uri in ["//evil.example", "//evil.example/login"] {
        let res = get(app(&store), uri).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{}", uri);
        assert!(res.headers().get(header::LOCATION).is_none(), "{}", uri);
    }
}

#[tokio::test]
async fn static_pages_render() {
    let store = Arc::new(MemoryStore::new());
    for uri in ["/", "/about-us/", "/mission/", "/contact/"] {
        let res = get(app(&store), uri).await;
        assert_eq!(res.status(), StatusCode::OK, "{}", uri);
    }
}

// ============================================================================
// Listings
// ============================================================================

#[tokio::test]
async fn blog_index_with_no_posts_renders_empty_state() {
    let store = Arc::new(MemoryStore::new());
    let res = get(app(&store), "/blog/").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains("No posts have been published yet"));
}

#[tokio::test]
async fn blog_index_features_newest_and_lists_five_more() {
    let store = Arc::new(MemoryStore::new());
    let author = account(&store, "pastor@church.org", NewAccount::default()).await;
    let now = Utc::now();
    for i in 1..=7 {
        store
            .insert_blog_post(NewBlogPost {
                title: format!("Sermon {}", i),
                content: "<p>Grace</p>".to_string(),
                author_id: author.id,
                published_at: Some(now - Duration::hours(10 - i)),
                image: "blog_posts/s.jpg".to_string(),
            })
            .await
            .unwrap();
    }

    let html = body_text(get(app(&store), "/blog/").await).await;

    // Sermon 7 is newest and featured; 6..2 follow in order; 1 is cut.
    assert_eq!(html.matches(">Sermon 7<").count(), 1);
    assert!(!html.contains("Sermon 1"));
    let positions: Vec<usize> = (2..=7)
        .rev()
        .map(|i| html.find(&format!(">Sermon {}<", i)).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn blog_detail_renders_post() {
    let store = Arc::new(MemoryStore::new());
    let author = account(&store, "pastor@church.org", NewAccount::default()).await;
    let post = store
        .insert_blog_post(NewBlogPost {
            title: "Easter".to_string(),
            content: "<p>He is risen</p>".to_string(),
            author_id: author.id,
            published_at: None,
            image: "blog_posts/e.jpg".to_string(),
        })
        .await
        .unwrap();

    let res = get(app(&store), &format!("/blog/{}/", post.id)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains("<p>He is risen</p>"));
}

#[tokio::test]
async fn carousel_renders_in_display_order() {
    let store = Arc::new(MemoryStore::new());
    for order in [3u32, 1, 2] {
        store
            .insert_slide(NewCarouselSlide {
                title: format!("Slide {}", order),
                content: String::new(),
                image: "carousel_images/x.jpg".to_string(),
                is_active: order == 1,
                display_order: order,
                published_at: None,
            })
            .await
            .unwrap();
    }

    let html = body_text(get(app(&store), "/").await).await;
    let first = html.find("data-order=\"1\"").unwrap();
    let second = html.find("data-order=\"2\"").unwrap();
    let third = html.find("data-order=\"3\"").unwrap();
    assert!(first < second && second < third);
}

// ============================================================================
// Forms
// ============================================================================

#[tokio::test]
async fn contact_without_email_is_rejected_and_not_stored() {
    let store = Arc::new(MemoryStore::new());
    let res = post_form(
        app(&store),
        "/contact/",
        "name=Ada&subject=Hello&message=Please+call",
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(res).await;
    assert!(html.contains("id=\"email-error\""));
    assert!(html.contains("value=\"Ada\""));
    assert_eq!(store.count_contact_messages().await.unwrap(), 0);
}

#[tokio::test]
async fn valid_contact_is_stored_and_redirects_with_notice() {
    let store = Arc::new(MemoryStore::new());
    let res = post_form(
        app(&store),
        "/contact/",
        "name=Ada&email=ada%40example.org&subject=Hello&message=Please+call",
    )
    .await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[header::LOCATION], "/contact/");
    assert!(set_cookie(&res).starts_with("flash=success"));
    assert_eq!(store.count_contact_messages().await.unwrap(), 1);
}

#[tokio::test]
async fn contact_rate_limit_returns_429() {
    let store = Arc::new(MemoryStore::new());
    let config = SiteConfig {
        contact_rate_limit: 1,
        ..SiteConfig::default()
    };
    let app = app_with(&store, config);
    let body = "name=Ada&email=ada%40example.org&subject=Hello&message=Hi";

    let res = post_form(app.clone(), "/contact/", body).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let res = post_form(app, "/contact/", body).await;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(store.count_contact_messages().await.unwrap(), 1);
}

#[tokio::test]
async fn double_subscription_stores_one_row_and_warns() {
    let store = Arc::new(MemoryStore::new());

    let first = post_form(app(&store), "/subscribe/", "email=joy%40church.org").await;
    assert_eq!(first.status(), StatusCode::SEE_OTHER);
    assert_eq!(first.headers()[header::LOCATION], "/");
    assert!(set_cookie(&first).starts_with("flash=success"));

    let second = post_form(app(&store), "/subscribe/", "email=joy%40church.org").await;
    assert_eq!(second.status(), StatusCode::SEE_OTHER);
    assert!(set_cookie(&second).starts_with("flash=warning"));

    assert_eq!(store.subscriptions(10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn subscription_without_email_flashes_error() {
    let store = Arc::new(MemoryStore::new());
    let res = post_form(app(&store), "/subscribe/", "").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(set_cookie(&res).starts_with("flash=error"));
    assert!(store.subscriptions(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn flash_notice_is_shown_once_and_cleared() {
    let store = Arc::new(MemoryStore::new());
    let req = Request::get("/")
        .header(header::COOKIE, "flash=success%7CThank%20you%20for%20subscribing")
        .body(Body::empty())
        .unwrap();
    let res = app(&store).oneshot(req).await.unwrap();
    assert!(set_cookie(&res).contains("Max-Age=0"));
    assert!(body_text(res).await.contains("Thank you for subscribing"));
}

// ============================================================================
// Admin API
// ============================================================================

#[tokio::test]
async fn admin_page_creation_requires_capability() {
    let store = Arc::new(MemoryStore::new());
    let pastor = account(
        &store,
        "pastor@church.org",
        NewAccount {
            is_pastor: true,
            ..NewAccount::default()
        },
    )
    .await;
    let staff = account(
        &store,
        "office@church.org",
        NewAccount {
            is_staff: true,
            ..NewAccount::default()
        },
    )
    .await;
    let payload = serde_json::json!({
        "title": "Youth",
        "slug": "youth",
        "content": "<p>Fridays</p><script>alert(1)</script>",
        "pageType": "base"
    });

    let res = post_json(app(&store), "/api/admin/pages", None, payload.clone()).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = post_json(
        app(&store),
        "/api/admin/pages",
        Some(&token_for(&pastor)),
        payload.clone(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = post_json(
        app(&store),
        "/api/admin/pages",
        Some(&token_for(&staff)),
        payload.clone(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Page = serde_json::from_str(&body_text(res).await).unwrap();
    assert_eq!(created.content, "<p>Fridays</p>");

    let res = post_json(
        app(&store),
        "/api/admin/pages",
        Some(&token_for(&staff)),
        payload,
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn admin_rejects_reserved_page_slug() {
    let store = Arc::new(MemoryStore::new());
    let staff = account(
        &store,
        "office@church.org",
        NewAccount {
            is_staff: true,
            ..NewAccount::default()
        },
    )
    .await;
    let res = post_json(
        app(&store),
        "/api/admin/pages",
        Some(&token_for(&staff)),
        serde_json::json!({ "title": "Blog", "slug": "blog", "content": "x" }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn pastor_publishes_blog_post_as_author() {
    let store = Arc::new(MemoryStore::new());
    let pastor = account(
        &store,
        "pastor@church.org",
        NewAccount {
            is_pastor: true,
            ..NewAccount::default()
        },
    )
    .await;

    let res = post_json(
        app(&store),
        "/api/admin/blog-posts",
        Some(&token_for(&pastor)),
        serde_json::json!({
            "title": "Advent",
            "content": "<p>Hope</p>",
            "image": "blog_posts/a.jpg"
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let post: BlogPost = serde_json::from_str(&body_text(res).await).unwrap();
    assert_eq!(post.author_id, pastor.id);
}

#[tokio::test]
async fn deactivated_account_loses_capabilities() {
    let store = Arc::new(MemoryStore::new());
    let staff = account(
        &store,
        "office@church.org",
        NewAccount {
            is_staff: true,
            ..NewAccount::default()
        },
    )
    .await;
    let token = token_for(&staff);
    store.set_account_active(staff.id, false).await.unwrap();

    let req = Request::get("/api/admin/messages")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let res = app(&store).oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

async fn staff(store: &MemoryStore) -> String {
    let account = account(
        store,
        "office@church.org",
        NewAccount {
            is_staff: true,
            ..NewAccount::default()
        },
    )
    .await;
    token_for(&account)
}

#[tokio::test]
async fn admin_rejects_values_wider_than_their_columns() {
    let store = Arc::new(MemoryStore::new());
    let token = staff(&store).await;
    let long = |n: usize| "x".repeat(n);

    let cases = [
        (
            "/api/admin/team-members",
            serde_json::json!({
                "name": "Ruth",
                "position": "Youth Leader",
                "bio": "Youth fellowship",
                "photo": "team/ruth.jpg",
                "phoneNumber": "0".repeat(25)
            }),
            "phoneNumber",
        ),
        (
            "/api/admin/testimonials",
            serde_json::json!({
                "name": "Kofi",
                "content": "Blessed",
                "company": long(101)
            }),
            "company",
        ),
        (
            "/api/admin/social-links",
            serde_json::json!({
                "platform": "facebook",
                "url": format!("https://facebook.com/{}", long(200))
            }),
            "url",
        ),
        (
            "/api/admin/carousel",
            serde_json::json!({
                "title": "Easter",
                "image": "carousel_images/easter.jpg",
                "displayOrder": 3_000_000_000u64
            }),
            "displayOrder",
        ),
    ];

    for (uri, payload, field) in cases {
        let res = post_json(app(&store), uri, Some(&token), payload).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body_text(res).await.contains(field), "{}", uri);
    }
    assert!(store.team_members().await.unwrap().is_empty());
    assert!(store.testimonials(10).await.unwrap().is_empty());
    assert!(store.social_links().await.unwrap().is_empty());
    assert!(store.carousel_slides(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn created_team_and_news_appear_on_public_pages() {
    let store = Arc::new(MemoryStore::new());
    let token = staff(&store).await;

    let res = post_json(
        app(&store),
        "/api/admin/team-members",
        Some(&token),
        serde_json::json!({
            "name": "Ruth Mensah",
            "position": "Youth Leader",
            "bio": "Leads the Friday youth fellowship.",
            "photo": "team/ruth.jpg",
            "phoneNumber": "+233201234567"
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = post_json(
        app(&store),
        "/api/admin/news",
        Some(&token),
        serde_json::json!({
            "title": "Harvest Thanksgiving",
            "content": "<p>Join us on Sunday.</p>",
            "author": "Church Office"
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let about = body_text(get(app(&store), "/about-us/").await).await;
    assert!(about.contains("Ruth Mensah"));
    assert!(about.contains("tel:+233201234567"));

    let home = body_text(get(app(&store), "/").await).await;
    assert!(home.contains("Harvest Thanksgiving"));
    assert!(home.contains("Join us on Sunday."));
}

const BOUNDARY: &str = "church-site-test-boundary";

fn png_of_size(len: usize) -> Vec<u8> {
    let mut bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.resize(len, 0);
    bytes
}

async fn upload(app: Router, uri: &str, token: &str, file_name: &str, bytes: &[u8]) -> Response {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let req = Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body))
        .unwrap();
    app.oneshot(req).await.unwrap()
}

#[tokio::test]
async fn upload_accepts_images_up_to_five_megabytes() {
    let store = Arc::new(MemoryStore::new());
    let token = staff(&store).await;
    let media_root = std::env::temp_dir().join(format!("church-site-media-{}", uuid::Uuid::new_v4()));
    let config = SiteConfig {
        media_root: media_root.clone(),
        ..SiteConfig::default()
    };

    let size = 3 * 1024 * 1024;
    let res = upload(
        app_with(&store, config.clone()),
        "/api/admin/uploads/carousel",
        &token,
        "slide.png",
        &png_of_size(size),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let json: serde_json::Value = serde_json::from_str(&body_text(res).await).unwrap();
    let path = json["path"].as_str().unwrap();
    assert!(path.starts_with("carousel_images/"));
    assert_eq!(json["url"], format!("/media/{}", path));
    assert_eq!(std::fs::metadata(media_root.join(path)).unwrap().len(), size as u64);

    let res = upload(
        app_with(&store, config),
        "/api/admin/uploads/carousel",
        &token,
        "huge.png",
        &png_of_size(6 * 1024 * 1024),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(res).await.contains("File too large"));

    std::fs::remove_dir_all(&media_root).unwrap();
}

#[tokio::test]
async fn upload_requires_capability_for_its_kind() {
    let store = Arc::new(MemoryStore::new());
    let uploader = account(
        &store,
        "events@church.org",
        NewAccount {
            is_event_uploader: true,
            ..NewAccount::default()
        },
    )
    .await;
    let res = upload(
        app(&store),
        "/api/admin/uploads/carousel",
        &token_for(&uploader),
        "slide.png",
        &png_of_size(64),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = upload(
        app(&store),
        "/api/admin/uploads/sermons",
        &token_for(&uploader),
        "slide.png",
        &png_of_size(64),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_probe_reports_ok() {
    let store = Arc::new(MemoryStore::new());
    let res = get(app(&store), "/health").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains("\"ok\""));
}
