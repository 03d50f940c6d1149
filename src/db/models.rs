//! Database Models - one struct per table, plus the `New*` payloads used for insertion.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::accounts::Capability;

/// Raised when a stored enum column holds a value this build does not know.
#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

// ============================================================================
// Accounts
// ============================================================================

/// Account model. Never serialized as-is; see `AccountInfo`.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_pastor: bool,
    pub is_event_uploader: bool,
    pub date_joined: DateTime<Utc>,
}

impl Account {
    /// Role/capability check evaluated by every privileged handler.
    pub fn can(&self, capability: Capability) -> bool {
        if !self.is_active {
            return false;
        }
        if self.is_superuser || self.is_staff {
            return true;
        }
        match capability {
            Capability::PublishBlog => self.is_pastor,
            Capability::UploadEvents => self.is_event_uploader,
            Capability::ManageContent | Capability::ReadInbox => false,
        }
    }

    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }
}

/// New account for insertion. `email` must already be normalized.
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_pastor: bool,
    pub is_event_uploader: bool,
}

/// Public view of an account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub is_staff: bool,
    pub is_pastor: bool,
    pub is_event_uploader: bool,
}

impl From<&Account> for AccountInfo {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            name: account.display_name(),
            is_staff: account.is_staff || account.is_superuser,
            is_pastor: account.is_pastor,
            is_event_uploader: account.is_event_uploader,
        }
    }
}

// ============================================================================
// Content
// ============================================================================

/// Blog post model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub published_at: DateTime<Utc>,
    pub image: String,
}

/// New blog post for creation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBlogPost {
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub published_at: Option<DateTime<Utc>>,
    pub image: String,
}

/// Event model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub location: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub location: String,
    pub image: Option<String>,
}

/// Carousel slide model. Listed by `display_order` ascending.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselSlide {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub image: String,
    pub is_active: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCarouselSlide {
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub image: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub display_order: u32,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: i64,
    pub name: String,
    pub content: String,
    pub company: Option<String>,
    pub position: Option<String>,
    pub photo: Option<String>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTestimonial {
    pub name: String,
    pub content: String,
    pub company: Option<String>,
    pub position: Option<String>,
    pub photo: Option<String>,
    pub date: NaiveDate,
}

/// Ministry positions a team member can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamPosition {
    Pastor,
    #[serde(rename = "Assistant Pastor")]
    AssistantPastor,
    Elder,
    Deacon,
    #[serde(rename = "Choir Leader")]
    ChoirLeader,
    #[serde(rename = "Youth Leader")]
    YouthLeader,
    Secretary,
    Treasurer,
    Usher,
    Member,
}

impl TeamPosition {
    pub const ALL: [TeamPosition; 10] = [
        TeamPosition::Pastor,
        TeamPosition::AssistantPastor,
        TeamPosition::Elder,
        TeamPosition::Deacon,
        TeamPosition::ChoirLeader,
        TeamPosition::YouthLeader,
        TeamPosition::Secretary,
        TeamPosition::Treasurer,
        TeamPosition::Usher,
        TeamPosition::Member,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TeamPosition::Pastor => "Pastor",
            TeamPosition::AssistantPastor => "Assistant Pastor",
            TeamPosition::Elder => "Elder",
            TeamPosition::Deacon => "Deacon",
            TeamPosition::ChoirLeader => "Choir Leader",
            TeamPosition::YouthLeader => "Youth Leader",
            TeamPosition::Secretary => "Secretary",
            TeamPosition::Treasurer => "Treasurer",
            TeamPosition::Usher => "Usher",
            TeamPosition::Member => "Member",
        }
    }
}

impl std::str::FromStr for TeamPosition {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "team position",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: i64,
    pub name: String,
    pub position: TeamPosition,
    pub bio: String,
    pub photo: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeamMember {
    pub name: String,
    pub position: TeamPosition,
    pub bio: String,
    pub photo: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChurchNews {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub published_at: DateTime<Utc>,
    pub author: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChurchNews {
    pub title: String,
    pub content: String,
    pub author: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVideo {
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail: String,
}

/// Which template a flat page is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageType {
    #[default]
    Base,
    Contact,
    Mission,
    Home,
    AboutUs,
}

impl PageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::Base => "base",
            PageType::Contact => "contact",
            PageType::Mission => "mission",
            PageType::Home => "home",
            PageType::AboutUs => "about-us",
        }
    }
}

impl std::str::FromStr for PageType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base" => Ok(PageType::Base),
            "contact" => Ok(PageType::Contact),
            "mission" => Ok(PageType::Mission),
            "home" => Ok(PageType::Home),
            "about-us" => Ok(PageType::AboutUs),
            other => Err(UnknownVariant {
                kind: "page type",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub image: Option<String>,
    pub page_type: PageType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPage {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub image: Option<String>,
    #[serde(default)]
    pub page_type: PageType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    Facebook,
    Twitter,
    Google,
    Linkedin,
}

impl SocialPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            SocialPlatform::Facebook => "facebook",
            SocialPlatform::Twitter => "twitter",
            SocialPlatform::Google => "google",
            SocialPlatform::Linkedin => "linkedin",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SocialPlatform::Facebook => "Facebook",
            SocialPlatform::Twitter => "Twitter",
            SocialPlatform::Google => "Google",
            SocialPlatform::Linkedin => "LinkedIn",
        }
    }
}

impl std::str::FromStr for SocialPlatform {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "facebook" => Ok(SocialPlatform::Facebook),
            "twitter" => Ok(SocialPlatform::Twitter),
            "google" => Ok(SocialPlatform::Google),
            "linkedin" => Ok(SocialPlatform::Linkedin),
            other => Err(UnknownVariant {
                kind: "social platform",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialMediaLink {
    pub id: i64,
    pub platform: SocialPlatform,
    pub url: String,
    pub icon_class: String,
}

fn default_icon_class() -> String {
    "bi".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSocialMediaLink {
    pub platform: SocialPlatform,
    pub url: String,
    #[serde(default = "default_icon_class")]
    pub icon_class: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterSubscription {
    pub id: i64,
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
}

/// Contact message. Insert-only: no update or delete path exists.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeographicLocation {
    pub id: i64,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGeographicLocation {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: Option<String>,
}
