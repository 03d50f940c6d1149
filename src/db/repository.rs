//! Data-access traits, one per entity type.
//!
//! Handlers only ever see `dyn SiteStore`; `PgStore` backs production and
//! `MemoryStore` backs tests and database-less development runs.

use async_trait::async_trait;
use std::time::Duration;

use super::models::*;
use crate::error::StoreError;

pub type StoreResult<T> = Result<T, StoreError>;

/// `display_order` as stored in the INTEGER column.
pub fn display_order(slide: &NewCarouselSlide) -> StoreResult<i32> {
    i32::try_from(slide.display_order).map_err(|_| {
        StoreError::Invalid(format!("displayOrder must be at most {}", i32::MAX))
    })
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Fails with `Conflict` when the (normalized) email is taken.
    async fn create_account(&self, account: NewAccount) -> StoreResult<Account>;
    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>>;
    async fn get_account(&self, id: i64) -> StoreResult<Option<Account>>;
    /// Returns false when no account matched.
    async fn set_account_active(&self, id: i64, active: bool) -> StoreResult<bool>;
}

#[async_trait]
pub trait BlogPostRepository: Send + Sync {
    /// Fails with `MissingReference` when the author does not exist.
    async fn insert_blog_post(&self, post: NewBlogPost) -> StoreResult<BlogPost>;
    /// Most recent first, by `published_at` then id.
    async fn recent_blog_posts(&self, limit: i64) -> StoreResult<Vec<BlogPost>>;
    async fn get_blog_post(&self, id: i64) -> StoreResult<Option<BlogPost>>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn insert_event(&self, event: NewEvent) -> StoreResult<Event>;
    /// Ascending by start time.
    async fn list_events(&self, limit: i64) -> StoreResult<Vec<Event>>;
}

#[async_trait]
pub trait CarouselRepository: Send + Sync {
    async fn insert_slide(&self, slide: NewCarouselSlide) -> StoreResult<CarouselSlide>;
    /// Ascending by `display_order`, ties broken by `published_at`. `None` is unbounded.
    async fn carousel_slides(&self, limit: Option<i64>) -> StoreResult<Vec<CarouselSlide>>;
}

#[async_trait]
pub trait TestimonialRepository: Send + Sync {
    async fn insert_testimonial(&self, testimonial: NewTestimonial) -> StoreResult<Testimonial>;
    /// Oldest first, by `date`.
    async fn testimonials(&self, limit: i64) -> StoreResult<Vec<Testimonial>>;
}

#[async_trait]
pub trait TeamRepository: Send + Sync {
    async fn insert_team_member(&self, member: NewTeamMember) -> StoreResult<TeamMember>;
    async fn team_members(&self) -> StoreResult<Vec<TeamMember>>;
}

#[async_trait]
pub trait NewsRepository: Send + Sync {
    async fn insert_news(&self, news: NewChurchNews) -> StoreResult<ChurchNews>;
    /// Newest first.
    async fn latest_news(&self, limit: i64) -> StoreResult<Vec<ChurchNews>>;
}

#[async_trait]
pub trait VideoRepository: Send + Sync {
    async fn insert_video(&self, video: NewVideo) -> StoreResult<Video>;
    /// Oldest upload first.
    async fn videos(&self, limit: i64) -> StoreResult<Vec<Video>>;
}

#[async_trait]
pub trait PageRepository: Send + Sync {
    /// Fails with `Conflict` when the slug is taken.
    async fn insert_page(&self, page: NewPage) -> StoreResult<Page>;
    async fn find_page_by_slug(&self, slug: &str) -> StoreResult<Option<Page>>;
}

#[async_trait]
pub trait SocialLinkRepository: Send + Sync {
    async fn insert_social_link(&self, link: NewSocialMediaLink) -> StoreResult<SocialMediaLink>;
    async fn social_links(&self) -> StoreResult<Vec<SocialMediaLink>>;
}

#[async_trait]
pub trait NewsletterRepository: Send + Sync {
    /// Fails with `Conflict` when the email is already subscribed.
    async fn insert_subscription(&self, email: &str) -> StoreResult<NewsletterSubscription>;
    async fn find_subscription(&self, email: &str) -> StoreResult<Option<NewsletterSubscription>>;
    /// Newest first.
    async fn subscriptions(&self, limit: i64) -> StoreResult<Vec<NewsletterSubscription>>;
}

#[async_trait]
pub trait ContactMessageRepository: Send + Sync {
    async fn insert_contact_message(&self, message: NewContactMessage)
        -> StoreResult<ContactMessage>;
    /// Newest first.
    async fn contact_messages(&self, limit: i64) -> StoreResult<Vec<ContactMessage>>;
    async fn count_contact_messages(&self) -> StoreResult<i64>;
}

#[async_trait]
pub trait LocationRepository: Send + Sync {
    async fn insert_location(&self, location: NewGeographicLocation)
        -> StoreResult<GeographicLocation>;
    async fn locations(&self) -> StoreResult<Vec<GeographicLocation>>;
}

#[async_trait]
pub trait StoreHealth: Send + Sync {
    /// Round-trip latency of a trivial query.
    async fn health_check(&self) -> StoreResult<Duration>;
    fn backend(&self) -> &'static str;
}

/// Everything the site needs from its backing store.
pub trait SiteStore:
    AccountRepository
    + BlogPostRepository
    + EventRepository
    + CarouselRepository
    + TestimonialRepository
    + TeamRepository
    + NewsRepository
    + VideoRepository
    + PageRepository
    + SocialLinkRepository
    + NewsletterRepository
    + ContactMessageRepository
    + LocationRepository
    + StoreHealth
{
}

impl<T> SiteStore for T where
    T: AccountRepository
        + BlogPostRepository
        + EventRepository
        + CarouselRepository
        + TestimonialRepository
        + TeamRepository
        + NewsRepository
        + VideoRepository
        + PageRepository
        + SocialLinkRepository
        + NewsletterRepository
        + ContactMessageRepository
        + LocationRepository
        + StoreHealth
{
}
