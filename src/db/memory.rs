//! In-process store used when no database is configured, and by the test suite.

use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Reverse;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::models::*;
use super::repository::*;
use crate::error::StoreError;

#[derive(Default)]
struct Tables {
    next_id: i64,
    accounts: Vec<Account>,
    blog_posts: Vec<BlogPost>,
    events: Vec<Event>,
    slides: Vec<CarouselSlide>,
    testimonials: Vec<Testimonial>,
    team: Vec<TeamMember>,
    news: Vec<ChurchNews>,
    videos: Vec<Video>,
    pages: Vec<Page>,
    social_links: Vec<SocialMediaLink>,
    subscriptions: Vec<NewsletterSubscription>,
    messages: Vec<ContactMessage>,
    locations: Vec<GeographicLocation>,
}

impl Tables {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn limited<T: Clone>(rows: Vec<&T>, limit: i64) -> Vec<T> {
    let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
    rows.into_iter().take(limit).cloned().collect()
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn create_account(&self, account: NewAccount) -> StoreResult<Account> {
        let mut t = self.tables.write().await;
        if t.accounts.iter().any(|a| a.email == account.email) {
            return Err(StoreError::Conflict {
                entity: "account",
                field: "email",
            });
        }
        let row = Account {
            id: t.id(),
            email: account.email,
            first_name: account.first_name,
            last_name: account.last_name,
            password_hash: account.password_hash,
            is_active: true,
            is_staff: account.is_staff,
            is_superuser: account.is_superuser,
            is_pastor: account.is_pastor,
            is_event_uploader: account.is_event_uploader,
            date_joined: Utc::now(),
        };
        t.accounts.push(row.clone());
        Ok(row)
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let t = self.tables.read().await;
        Ok(t.accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn get_account(&self, id: i64) -> StoreResult<Option<Account>> {
        let t = self.tables.read().await;
        Ok(t.accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn set_account_active(&self, id: i64, active: bool) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        match t.accounts.iter_mut().find(|a| a.id == id) {
            Some(account) => {
                account.is_active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl BlogPostRepository for MemoryStore {
    async fn insert_blog_post(&self, post: NewBlogPost) -> StoreResult<BlogPost> {
        let mut t = self.tables.write().await;
        if !t.accounts.iter().any(|a| a.id == post.author_id) {
            return Err(StoreError::MissingReference("account"));
        }
        let row = BlogPost {
            id: t.id(),
            title: post.title,
            content: post.content,
            author_id: post.author_id,
            published_at: post.published_at.unwrap_or_else(Utc::now),
            image: post.image,
        };
        t.blog_posts.push(row.clone());
        Ok(row)
    }

    async fn recent_blog_posts(&self, limit: i64) -> StoreResult<Vec<BlogPost>> {
        let t = self.tables.read().await;
        let mut rows: Vec<&BlogPost> = t.blog_posts.iter().collect();
        rows.sort_by_key(|p| Reverse((p.published_at, p.id)));
        Ok(limited(rows, limit))
    }

    async fn get_blog_post(&self, id: i64) -> StoreResult<Option<BlogPost>> {
        let t = self.tables.read().await;
        Ok(t.blog_posts.iter().find(|p| p.id == id).cloned())
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn insert_event(&self, event: NewEvent) -> StoreResult<Event> {
        let mut t = self.tables.write().await;
        let now = Utc::now();
        let row = Event {
            id: t.id(),
            title: event.title,
            description: event.description,
            starts_at: event.starts_at,
            location: event.location,
            image: event.image,
            created_at: now,
            updated_at: now,
        };
        t.events.push(row.clone());
        Ok(row)
    }

    async fn list_events(&self, limit: i64) -> StoreResult<Vec<Event>> {
        let t = self.tables.read().await;
        let mut rows: Vec<&Event> = t.events.iter().collect();
        rows.sort_by_key(|e| (e.starts_at, e.id));
        Ok(limited(rows, limit))
    }
}

#[async_trait]
impl CarouselRepository for MemoryStore {
    async fn insert_slide(&self, slide: NewCarouselSlide) -> StoreResult<CarouselSlide> {
        let display_order = display_order(&slide)?;
        let mut t = self.tables.write().await;
        let now = Utc::now();
        let row = CarouselSlide {
            id: t.id(),
            title: slide.title,
            content: slide.content,
            image: slide.image,
            is_active: slide.is_active,
            display_order,
            created_at: now,
            published_at: slide.published_at.unwrap_or(now),
        };
        t.slides.push(row.clone());
        Ok(row)
    }

    async fn carousel_slides(&self, limit: Option<i64>) -> StoreResult<Vec<CarouselSlide>> {
        let t = self.tables.read().await;
        let mut rows: Vec<&CarouselSlide> = t.slides.iter().collect();
        rows.sort_by_key(|s| (s.display_order, s.published_at, s.id));
        Ok(limited(rows, limit.unwrap_or(i64::MAX)))
    }
}

#[async_trait]
impl TestimonialRepository for MemoryStore {
    async fn insert_testimonial(&self, testimonial: NewTestimonial) -> StoreResult<Testimonial> {
        let mut t = self.tables.write().await;
        let row = Testimonial {
            id: t.id(),
            name: testimonial.name,
            content: testimonial.content,
            company: testimonial.company,
            position: testimonial.position,
            photo: testimonial.photo,
            date: testimonial.date,
        };
        t.testimonials.push(row.clone());
        Ok(row)
    }

    async fn testimonials(&self, limit: i64) -> StoreResult<Vec<Testimonial>> {
        let t = self.tables.read().await;
        let mut rows: Vec<&Testimonial> = t.testimonials.iter().collect();
        rows.sort_by_key(|r| (r.date, r.id));
        Ok(limited(rows, limit))
    }
}

#[async_trait]
impl TeamRepository for MemoryStore {
    async fn insert_team_member(&self, member: NewTeamMember) -> StoreResult<TeamMember> {
        let mut t = self.tables.write().await;
        let row = TeamMember {
            id: t.id(),
            name: member.name,
            position: member.position,
            bio: member.bio,
            photo: member.photo,
            email: member.email,
            phone_number: member.phone_number,
        };
        t.team.push(row.clone());
        Ok(row)
    }

    async fn team_members(&self) -> StoreResult<Vec<TeamMember>> {
        Ok(self.tables.read().await.team.clone())
    }
}

#[async_trait]
impl NewsRepository for MemoryStore {
    async fn insert_news(&self, news: NewChurchNews) -> StoreResult<ChurchNews> {
        let mut t = self.tables.write().await;
        let row = ChurchNews {
            id: t.id(),
            title: news.title,
            content: news.content,
            published_at: Utc::now(),
            author: news.author,
            image: news.image,
        };
        t.news.push(row.clone());
        Ok(row)
    }

    async fn latest_news(&self, limit: i64) -> StoreResult<Vec<ChurchNews>> {
        let t = self.tables.read().await;
        let mut rows: Vec<&ChurchNews> = t.news.iter().collect();
        rows.sort_by_key(|n| Reverse((n.published_at, n.id)));
        Ok(limited(rows, limit))
    }
}

#[async_trait]
impl VideoRepository for MemoryStore {
    async fn insert_video(&self, video: NewVideo) -> StoreResult<Video> {
        let mut t = self.tables.write().await;
        let row = Video {
            id: t.id(),
            title: video.title,
            description: video.description,
            video_url: video.video_url,
            thumbnail: video.thumbnail,
            uploaded_at: Utc::now(),
        };
        t.videos.push(row.clone());
        Ok(row)
    }

    async fn videos(&self, limit: i64) -> StoreResult<Vec<Video>> {
        let t = self.tables.read().await;
        let mut rows: Vec<&Video> = t.videos.iter().collect();
        rows.sort_by_key(|v| (v.uploaded_at, v.id));
        Ok(limited(rows, limit))
    }
}

#[async_trait]
impl PageRepository for MemoryStore {
    async fn insert_page(&self, page: NewPage) -> StoreResult<Page> {
        let mut t = self.tables.write().await;
        if t.pages.iter().any(|p| p.slug == page.slug) {
            return Err(StoreError::Conflict {
                entity: "page",
                field: "slug",
            });
        }
        let row = Page {
            id: t.id(),
            title: page.title,
            slug: page.slug,
            content: page.content,
            image: page.image,
            page_type: page.page_type,
        };
        t.pages.push(row.clone());
        Ok(row)
    }

    async fn find_page_by_slug(&self, slug: &str) -> StoreResult<Option<Page>> {
        let t = self.tables.read().await;
        Ok(t.pages.iter().find(|p| p.slug == slug).cloned())
    }
}

#[async_trait]
impl SocialLinkRepository for MemoryStore {
    async fn insert_social_link(&self, link: NewSocialMediaLink) -> StoreResult<SocialMediaLink> {
        let mut t = self.tables.write().await;
        let row = SocialMediaLink {
            id: t.id(),
            platform: link.platform,
            url: link.url,
            icon_class: link.icon_class,
        };
        t.social_links.push(row.clone());
        Ok(row)
    }

    async fn social_links(&self) -> StoreResult<Vec<SocialMediaLink>> {
        Ok(self.tables.read().await.social_links.clone())
    }
}

#[async_trait]
impl NewsletterRepository for MemoryStore {
    async fn insert_subscription(&self, email: &str) -> StoreResult<NewsletterSubscription> {
        let mut t = self.tables.write().await;
        if t.subscriptions.iter().any(|s| s.email == email) {
            return Err(StoreError::Conflict {
                entity: "newsletter subscription",
                field: "email",
            });
        }
        let row = NewsletterSubscription {
            id: t.id(),
            email: email.to_string(),
            subscribed_at: Utc::now(),
        };
        t.subscriptions.push(row.clone());
        Ok(row)
    }

    async fn find_subscription(&self, email: &str) -> StoreResult<Option<NewsletterSubscription>> {
        let t = self.tables.read().await;
        Ok(t.subscriptions.iter().find(|s| s.email == email).cloned())
    }

    async fn subscriptions(&self, limit: i64) -> StoreResult<Vec<NewsletterSubscription>> {
        let t = self.tables.read().await;
        let mut rows: Vec<&NewsletterSubscription> = t.subscriptions.iter().collect();
        rows.sort_by_key(|s| Reverse((s.subscribed_at, s.id)));
        Ok(limited(rows, limit))
    }
}

#[async_trait]
impl ContactMessageRepository for MemoryStore {
    async fn insert_contact_message(
        &self,
        message: NewContactMessage,
    ) -> StoreResult<ContactMessage> {
        let mut t = self.tables.write().await;
        let row = ContactMessage {
            id: t.id(),
            name: message.name,
            email: message.email,
            subject: message.subject,
            message: message.message,
            submitted_at: Utc::now(),
        };
        t.messages.push(row.clone());
        Ok(row)
    }

    async fn contact_messages(&self, limit: i64) -> StoreResult<Vec<ContactMessage>> {
        let t = self.tables.read().await;
        let mut rows: Vec<&ContactMessage> = t.messages.iter().collect();
        rows.sort_by_key(|m| Reverse((m.submitted_at, m.id)));
        Ok(limited(rows, limit))
    }

    async fn count_contact_messages(&self) -> StoreResult<i64> {
        Ok(self.tables.read().await.messages.len() as i64)
    }
}

#[async_trait]
impl LocationRepository for MemoryStore {
    async fn insert_location(
        &self,
        location: NewGeographicLocation,
    ) -> StoreResult<GeographicLocation> {
        let mut t = self.tables.write().await;
        let row = GeographicLocation {
            id: t.id(),
            address: location.address,
            latitude: location.latitude,
            longitude: location.longitude,
            description: location.description,
        };
        t.locations.push(row.clone());
        Ok(row)
    }

    async fn locations(&self) -> StoreResult<Vec<GeographicLocation>> {
        Ok(self.tables.read().await.locations.clone())
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn health_check(&self) -> StoreResult<Duration> {
        let start = Instant::now();
        let _guard = self.tables.read().await;
        Ok(start.elapsed())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, NaiveDate};

    async fn store_with_author() -> (MemoryStore, i64) {
        let store = MemoryStore::new();
        let author = store
            .create_account(NewAccount {
                email: "pastor@church.org".to_string(),
                is_pastor: true,
                ..Default::default()
            })
            .await
            .unwrap();
        (store, author.id)
    }

    #[tokio::test]
    async fn test_duplicate_account_email_conflicts() {
        let (store, _) = store_with_author().await;
        let err = store
            .create_account(NewAccount {
                email: "pastor@church.org".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_blog_post_requires_existing_author() {
        let store = MemoryStore::new();
        let err = store
            .insert_blog_post(NewBlogPost {
                title: "Orphan".to_string(),
                content: String::new(),
                author_id: 99,
                published_at: None,
                image: "blog_posts/a.jpg".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingReference("account")));
    }

    #[tokio::test]
    async fn test_recent_blog_posts_newest_first() {
        let (store, author) = store_with_author().await;
        let base = Utc::now();
        for (title, days) in [("old", 3), ("newest", 0), ("middle", 1)] {
            store
                .insert_blog_post(NewBlogPost {
                    title: title.to_string(),
                    content: String::new(),
                    author_id: author,
                    published_at: Some(base - ChronoDuration::days(days)),
                    image: "blog_posts/x.jpg".to_string(),
                })
                .await
                .unwrap();
        }
        let titles: Vec<String> = store
            .recent_blog_posts(2)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["newest", "middle"]);
    }

    #[tokio::test]
    async fn test_testimonials_oldest_first_and_limited() {
        let store = MemoryStore::new();
        for day in [20, 5, 12, 1] {
            store
                .insert_testimonial(NewTestimonial {
                    name: format!("day {day}"),
                    content: String::new(),
                    company: None,
                    position: None,
                    photo: None,
                    date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
                })
                .await
                .unwrap();
        }
        let names: Vec<String> = store
            .testimonials(3)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["day 1", "day 5", "day 12"]);
    }

    #[tokio::test]
    async fn test_duplicate_page_slug_conflicts() {
        let store = MemoryStore::new();
        let page = NewPage {
            title: "Youth".to_string(),
            slug: "youth".to_string(),
            content: String::new(),
            image: None,
            page_type: PageType::Base,
        };
        store.insert_page(page.clone()).await.unwrap();
        assert!(store.insert_page(page).await.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn test_out_of_range_display_order_is_rejected() {
        let store = MemoryStore::new();
        let err = store
            .insert_slide(NewCarouselSlide {
                title: "Easter".to_string(),
                content: String::new(),
                image: "carousel_images/easter.jpg".to_string(),
                is_active: true,
                display_order: u32::MAX,
                published_at: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
        assert!(store.carousel_slides(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_health_check_reports_memory_backend() {
        let store = MemoryStore::new();
        assert!(store.health_check().await.is_ok());
        assert_eq!(store.backend(), "memory");
    }
}
