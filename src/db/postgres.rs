//! PostgreSQL-backed repositories.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, FromRow, PgPool, Row};
use std::str::FromStr;
use std::time::{Duration, Instant};

use super::models::*;
use super::repository::*;
use crate::error::StoreError;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translate constraint violations into their typed `StoreError` counterparts.
fn classify(e: sqlx::Error, entity: &'static str, field: &'static str) -> StoreError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return StoreError::Conflict { entity, field };
        }
        if db.is_foreign_key_violation() {
            return StoreError::MissingReference("account");
        }
    }
    StoreError::from(e)
}

fn parse_column<T>(row: &PgRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = UnknownVariant>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e: UnknownVariant| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for TeamMember {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            position: parse_column(row, "position")?,
            bio: row.try_get("bio")?,
            photo: row.try_get("photo")?,
            email: row.try_get("email")?,
            phone_number: row.try_get("phone_number")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for Page {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            slug: row.try_get("slug")?,
            content: row.try_get("content")?,
            image: row.try_get("image")?,
            page_type: parse_column(row, "page_type")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for SocialMediaLink {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            platform: parse_column(row, "platform")?,
            url: row.try_get("url")?,
            icon_class: row.try_get("icon_class")?,
        })
    }
}

const ACCOUNT_COLUMNS: &str = "id, email, first_name, last_name, password_hash, is_active, \
     is_staff, is_superuser, is_pastor, is_event_uploader, date_joined";

#[async_trait]
impl AccountRepository for PgStore {
    async fn create_account(&self, account: NewAccount) -> StoreResult<Account> {
        sqlx::query_as::<_, Account>(&format!(
            r#"
            INSERT INTO accounts (email, first_name, last_name, password_hash,
                                  is_staff, is_superuser, is_pastor, is_event_uploader)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(&account.email)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.password_hash)
        .bind(account.is_staff)
        .bind(account.is_superuser)
        .bind(account.is_pastor)
        .bind(account.is_event_uploader)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, "account", "email"))
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    async fn get_account(&self, id: i64) -> StoreResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    async fn set_account_active(&self, id: i64, active: bool) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE accounts SET is_active = $1 WHERE id = $2")
            .bind(active)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl BlogPostRepository for PgStore {
    async fn insert_blog_post(&self, post: NewBlogPost) -> StoreResult<BlogPost> {
        sqlx::query_as::<_, BlogPost>(
            r#"
            INSERT INTO blog_posts (title, content, author_id, published_at, image)
            VALUES ($1, $2, $3, COALESCE($4, now()), $5)
            RETURNING id, title, content, author_id, published_at, image
            "#,
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.author_id)
        .bind(post.published_at)
        .bind(&post.image)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, "blog post", "id"))
    }

    async fn recent_blog_posts(&self, limit: i64) -> StoreResult<Vec<BlogPost>> {
        let posts = sqlx::query_as::<_, BlogPost>(
            r#"
            SELECT id, title, content, author_id, published_at, image
            FROM blog_posts
            ORDER BY published_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    async fn get_blog_post(&self, id: i64) -> StoreResult<Option<BlogPost>> {
        let post = sqlx::query_as::<_, BlogPost>(
            "SELECT id, title, content, author_id, published_at, image FROM blog_posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }
}

#[async_trait]
impl EventRepository for PgStore {
    async fn insert_event(&self, event: NewEvent) -> StoreResult<Event> {
        let row = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (title, description, starts_at, location, image)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, starts_at, location, image, created_at, updated_at
            "#,
        )
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.starts_at)
        .bind(&event.location)
        .bind(&event.image)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_events(&self, limit: i64) -> StoreResult<Vec<Event>> {
        let rows = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, description, starts_at, location, image, created_at, updated_at
            FROM events
            ORDER BY starts_at ASC, id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl CarouselRepository for PgStore {
    async fn insert_slide(&self, slide: NewCarouselSlide) -> StoreResult<CarouselSlide> {
        let display_order = display_order(&slide)?;
        let row = sqlx::query_as::<_, CarouselSlide>(
            r#"
            INSERT INTO carousel_slides (title, content, image, is_active, display_order, published_at)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, now()))
            RETURNING id, title, content, image, is_active, display_order, created_at, published_at
            "#,
        )
        .bind(&slide.title)
        .bind(&slide.content)
        .bind(&slide.image)
        .bind(slide.is_active)
        .bind(display_order)
        .bind(slide.published_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn carousel_slides(&self, limit: Option<i64>) -> StoreResult<Vec<CarouselSlide>> {
        // LIMIT NULL is LIMIT ALL in PostgreSQL.
        let rows = sqlx::query_as::<_, CarouselSlide>(
            r#"
            SELECT id, title, content, image, is_active, display_order, created_at, published_at
            FROM carousel_slides
            ORDER BY display_order ASC, published_at ASC, id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl TestimonialRepository for PgStore {
    async fn insert_testimonial(&self, testimonial: NewTestimonial) -> StoreResult<Testimonial> {
        let row = sqlx::query_as::<_, Testimonial>(
            r#"
            INSERT INTO testimonials (name, content, company, position, photo, date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, content, company, position, photo, date
            "#,
        )
        .bind(&testimonial.name)
        .bind(&testimonial.content)
        .bind(&testimonial.company)
        .bind(&testimonial.position)
        .bind(&testimonial.photo)
        .bind(testimonial.date)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn testimonials(&self, limit: i64) -> StoreResult<Vec<Testimonial>> {
        let rows = sqlx::query_as::<_, Testimonial>(
            r#"
            SELECT id, name, content, company, position, photo, date
            FROM testimonials
            ORDER BY date ASC, id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl TeamRepository for PgStore {
    async fn insert_team_member(&self, member: NewTeamMember) -> StoreResult<TeamMember> {
        let row = sqlx::query_as::<_, TeamMember>(
            r#"
            INSERT INTO team_members (name, position, bio, photo, email, phone_number)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, position, bio, photo, email, phone_number
            "#,
        )
        .bind(&member.name)
        .bind(member.position.as_str())
        .bind(&member.bio)
        .bind(&member.photo)
        .bind(&member.email)
        .bind(&member.phone_number)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn team_members(&self) -> StoreResult<Vec<TeamMember>> {
        let rows = sqlx::query_as::<_, TeamMember>(
            "SELECT id, name, position, bio, photo, email, phone_number FROM team_members ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl NewsRepository for PgStore {
    async fn insert_news(&self, news: NewChurchNews) -> StoreResult<ChurchNews> {
        let row = sqlx::query_as::<_, ChurchNews>(
            r#"
            INSERT INTO church_news (title, content, author, image)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, content, published_at, author, image
            "#,
        )
        .bind(&news.title)
        .bind(&news.content)
        .bind(&news.author)
        .bind(&news.image)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn latest_news(&self, limit: i64) -> StoreResult<Vec<ChurchNews>> {
        let rows = sqlx::query_as::<_, ChurchNews>(
            r#"
            SELECT id, title, content, published_at, author, image
            FROM church_news
            ORDER BY published_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl VideoRepository for PgStore {
    async fn insert_video(&self, video: NewVideo) -> StoreResult<Video> {
        let row = sqlx::query_as::<_, Video>(
            r#"
            INSERT INTO videos (title, description, video_url, thumbnail)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, video_url, thumbnail, uploaded_at
            "#,
        )
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.video_url)
        .bind(&video.thumbnail)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn videos(&self, limit: i64) -> StoreResult<Vec<Video>> {
        let rows = sqlx::query_as::<_, Video>(
            r#"
            SELECT id, title, description, video_url, thumbnail, uploaded_at
            FROM videos
            ORDER BY uploaded_at ASC, id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl PageRepository for PgStore {
    async fn insert_page(&self, page: NewPage) -> StoreResult<Page> {
        sqlx::query_as::<_, Page>(
            r#"
            INSERT INTO pages (title, slug, content, image, page_type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, slug, content, image, page_type
            "#,
        )
        .bind(&page.title)
        .bind(&page.slug)
        .bind(&page.content)
        .bind(&page.image)
        .bind(page.page_type.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, "page", "slug"))
    }

    async fn find_page_by_slug(&self, slug: &str) -> StoreResult<Option<Page>> {
        let page = sqlx::query_as::<_, Page>(
            "SELECT id, title, slug, content, image, page_type FROM pages WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(page)
    }
}

#[async_trait]
impl SocialLinkRepository for PgStore {
    async fn insert_social_link(&self, link: NewSocialMediaLink) -> StoreResult<SocialMediaLink> {
        let row = sqlx::query_as::<_, SocialMediaLink>(
            r#"
            INSERT INTO social_media_links (platform, url, icon_class)
            VALUES ($1, $2, $3)
            RETURNING id, platform, url, icon_class
            "#,
        )
        .bind(link.platform.as_str())
        .bind(&link.url)
        .bind(&link.icon_class)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn social_links(&self) -> StoreResult<Vec<SocialMediaLink>> {
        let rows = sqlx::query_as::<_, SocialMediaLink>(
            "SELECT id, platform, url, icon_class FROM social_media_links ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl NewsletterRepository for PgStore {
    async fn insert_subscription(&self, email: &str) -> StoreResult<NewsletterSubscription> {
        sqlx::query_as::<_, NewsletterSubscription>(
            r#"
            INSERT INTO newsletter_subscriptions (email)
            VALUES ($1)
            RETURNING id, email, subscribed_at
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, "newsletter subscription", "email"))
    }

    async fn find_subscription(&self, email: &str) -> StoreResult<Option<NewsletterSubscription>> {
        let row = sqlx::query_as::<_, NewsletterSubscription>(
            "SELECT id, email, subscribed_at FROM newsletter_subscriptions WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn subscriptions(&self, limit: i64) -> StoreResult<Vec<NewsletterSubscription>> {
        let rows = sqlx::query_as::<_, NewsletterSubscription>(
            r#"
            SELECT id, email, subscribed_at
            FROM newsletter_subscriptions
            ORDER BY subscribed_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl ContactMessageRepository for PgStore {
    async fn insert_contact_message(
        &self,
        message: NewContactMessage,
    ) -> StoreResult<ContactMessage> {
        let row = sqlx::query_as::<_, ContactMessage>(
            r#"
            INSERT INTO contact_messages (name, email, subject, message)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, subject, message, submitted_at
            "#,
        )
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.subject)
        .bind(&message.message)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn contact_messages(&self, limit: i64) -> StoreResult<Vec<ContactMessage>> {
        let rows = sqlx::query_as::<_, ContactMessage>(
            r#"
            SELECT id, name, email, subject, message, submitted_at
            FROM contact_messages
            ORDER BY submitted_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_contact_messages(&self) -> StoreResult<i64> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM contact_messages")
            .fetch_one(&self.pool)
            .await?;
        Ok(total.0)
    }
}

#[async_trait]
impl LocationRepository for PgStore {
    async fn insert_location(
        &self,
        location: NewGeographicLocation,
    ) -> StoreResult<GeographicLocation> {
        let row = sqlx::query_as::<_, GeographicLocation>(
            r#"
            INSERT INTO geographic_locations (address, latitude, longitude, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, address, latitude, longitude, description
            "#,
        )
        .bind(&location.address)
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(&location.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn locations(&self) -> StoreResult<Vec<GeographicLocation>> {
        let rows = sqlx::query_as::<_, GeographicLocation>(
            "SELECT id, address, latitude, longitude, description FROM geographic_locations ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl StoreHealth for PgStore {
    async fn health_check(&self) -> StoreResult<Duration> {
        let start = Instant::now();
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(start.elapsed())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
