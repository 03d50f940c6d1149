//! Church site - public pages, forms and the admin content API

pub mod accounts;
pub mod config;
pub mod db;
pub mod error;
pub mod flash;
pub mod forms;
pub mod logging;
pub mod rate_limit;
pub mod routes;
pub mod views;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

use crate::config::SiteConfig;
use crate::db::{MemoryStore, PgStore, SiteStore};
use crate::rate_limit::RateLimiter;

/// Login attempts allowed per client IP per hour.
const LOGIN_ATTEMPTS_PER_WINDOW: u32 = 20;

/// Request bodies above this are refused with 413.
pub const MAX_REQUEST_BODY: usize = 8 * 1024 * 1024;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SiteStore>,
    pub config: Arc<SiteConfig>,
    pub contact_limiter: RateLimiter,
    pub login_limiter: RateLimiter,
}

impl AppState {
    pub fn new(store: Arc<dyn SiteStore>, config: SiteConfig) -> Self {
        Self {
            store,
            contact_limiter: RateLimiter::new(config.contact_rate_limit),
            login_limiter: RateLimiter::new(LOGIN_ATTEMPTS_PER_WINDOW),
            config: Arc::new(config),
        }
    }
}

/// Configure CORS for the admin API from ALLOWED_ORIGINS (comma-separated).
/// Falls back to the local development frontends.
pub fn configure_cors() -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = std::env::var("ALLOWED_ORIGINS")
        .ok()
        .map(|s| {
            s.split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty())
        .unwrap_or_else(|| {
            vec![
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
            ]
        });

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

fn admin_routes() -> Router<AppState> {
    use routes::admin;

    Router::new()
        .route("/blog-posts", post(admin::create_blog_post))
        .route(
            "/events",
            get(admin::list_events).post(admin::create_event),
        )
        .route("/carousel", post(admin::create_slide))
        .route("/testimonials", post(admin::create_testimonial))
        .route("/team-members", post(admin::create_team_member))
        .route("/news", post(admin::create_news))
        .route("/videos", post(admin::create_video))
        .route("/pages", post(admin::create_page))
        .route("/social-links", post(admin::create_social_link))
        .route("/locations", post(admin::create_location))
        .route("/messages", get(admin::list_messages))
        .route("/subscriptions", get(admin::list_subscriptions))
        .route("/uploads/{kind}", post(routes::upload::upload_image))
}

/// Create and configure the application router.
///
/// Literal paths always take precedence over the `/{slug}/` page route, so a
/// page can never shadow a built-in page.
pub fn create_app(state: AppState) -> Router {
    let cors = configure_cors();

    Router::new()
        .route("/", get(routes::site::home))
        .route("/about-us/", get(routes::site::about_us))
        .route("/mission/", get(routes::site::mission))
        .route("/blog/", get(routes::blog::index))
        .route("/blog/{id}/", get(routes::blog::detail))
        .route(
            "/contact/",
            get(routes::contact::show_contact).post(routes::contact::submit_contact),
        )
        .route("/subscribe/", post(routes::subscribe::subscribe))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/verify", post(routes::auth::verify_token))
        .nest("/api/admin", admin_routes())
        .route("/health", get(routes::health::health_ping))
        .route("/health/database", get(routes::health::health_database))
        .route("/health/ready", get(routes::health::health_ready))
        .route("/{slug}/", get(routes::pages::render_page))
        .fallback(routes::pages::fallback)
        .with_state(state)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        // 8 MB cap: room for a 5 MB image plus multipart framing. axum's own 2 MB
        // extractor limit is lifted so this layer is the only one that applies.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY))
        .layer(cors)
}

/// Run the server (used by main).
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = SiteConfig::from_env();

    // Held for the life of the process; see LogGuards.
    let _log_guards = logging::init(&config);

    routes::health::init_start_time();
    config.validate()?;

    let store: Arc<dyn SiteStore> = if std::env::var("DATABASE_URL").is_ok() {
        let pool = db::init_pool(None)
            .await
            .context("failed to initialize database pool")?;
        db::run_migrations(&pool)
            .await
            .context("failed to run database migrations")?;
        Arc::new(PgStore::new(pool))
    } else {
        tracing::warn!(
            "DATABASE_URL not set. Running on the in-memory store; content is lost on restart."
        );
        Arc::new(MemoryStore::new())
    };

    let addr = config.bind_addr().context("invalid HOST/PORT configuration")?;
    tracing::info!(
        site = %config.site_name,
        backend = store.backend(),
        "Starting server on {}",
        addr
    );

    let app = create_app(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;

    Ok(())
}
