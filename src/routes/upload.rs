/**
 * Upload Routes
 * Image uploads for site content, stored below the media root
 */
use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::accounts::Capability;
use crate::routes::auth::authorize;
use crate::routes::{api_error, ApiError};
use crate::AppState;

const MAX_FILE_SIZE: usize = 5 * 1024 * 1024; // 5MB
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// Which entity an uploaded image belongs to. Each kind has its own directory below
/// the media root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Events,
    BlogPosts,
    Carousel,
    Testimonials,
    Team,
    News,
    Thumbnails,
    Pages,
}

impl UploadKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "events" => Some(UploadKind::Events),
            "blog-posts" => Some(UploadKind::BlogPosts),
            "carousel" => Some(UploadKind::Carousel),
            "testimonials" => Some(UploadKind::Testimonials),
            "team" => Some(UploadKind::Team),
            "news" => Some(UploadKind::News),
            "thumbnails" => Some(UploadKind::Thumbnails),
            "pages" => Some(UploadKind::Pages),
            _ => None,
        }
    }

    pub fn directory(&self) -> &'static str {
        match self {
            UploadKind::Events => "events",
            UploadKind::BlogPosts => "blog_posts",
            UploadKind::Carousel => "carousel_images",
            UploadKind::Testimonials => "testimonials",
            UploadKind::Team => "team",
            UploadKind::News => "news",
            UploadKind::Thumbnails => "thumbnails",
            UploadKind::Pages => "page_photos",
        }
    }

    /// Uploaders may store images for the entities they are allowed to create.
    pub fn capability(&self) -> Capability {
        match self {
            UploadKind::Events => Capability::UploadEvents,
            UploadKind::BlogPosts => Capability::PublishBlog,
            _ => Capability::ManageContent,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Relative to the media root; this is what entity `image` fields store.
    pub path: String,
    pub url: String,
    pub size: usize,
    pub mime_type: String,
}

fn validate_image_magic_bytes(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() < 4 {
        return None;
    }
    match bytes {
        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        // PNG: 89 50 4E 47
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        // GIF: 47 49 46 38
        [0x47, 0x49, 0x46, 0x38, ..] => Some("image/gif"),
        // WebP: 52 49 46 46 ... 57 45 42 50
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        _ => None,
    }
}

fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    }
}

/// Check an uploaded file and return its detected MIME type.
fn check_image(file_name: &str, bytes: &[u8]) -> Result<&'static str, ApiError> {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Unsupported file type. Allowed: JPEG, PNG, WebP, GIF.",
        ));
    }
    if bytes.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Empty file"));
    }
    if bytes.len() > MAX_FILE_SIZE {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "File too large. Maximum size is 5MB.",
        ));
    }
    validate_image_magic_bytes(bytes).ok_or_else(|| {
        api_error(
            StatusCode::BAD_REQUEST,
            "File content does not match an allowed image type.",
        )
    })
}

/// POST /api/admin/uploads/{kind}
pub async fn upload_image(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let kind = UploadKind::parse(&kind)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Unknown upload kind"))?;
    let account = authorize(&state, &headers, kind.capability()).await?;

    let field = match multipart.next_field().await {
        Ok(Some(field)) => field,
        Ok(None) => return Err(api_error(StatusCode::BAD_REQUEST, "No file provided")),
        Err(e) => {
            tracing::error!("Multipart error: {}", e);
            return Err(api_error(StatusCode::BAD_REQUEST, "Invalid multipart data"));
        }
    };

    let original_name = field.file_name().unwrap_or("unknown").to_string();
    let bytes = field.bytes().await.map_err(|e| {
        tracing::error!("Failed to read upload bytes: {}", e);
        api_error(StatusCode::BAD_REQUEST, "Failed to read file data")
    })?;

    let mime_type = check_image(&original_name, &bytes)?;

    let dir: PathBuf = state.config.media_root.join(kind.directory());
    if let Err(e) = tokio::fs::create_dir_all(&dir).await {
        tracing::error!("Failed to create upload directory {}: {}", dir.display(), e);
        return Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to initialize upload directory",
        ));
    }

    let filename = format!("{}.{}", Uuid::new_v4(), extension_for_mime(mime_type));
    if let Err(e) = tokio::fs::write(dir.join(&filename), &bytes).await {
        tracing::error!("Failed to write upload file: {}", e);
        return Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to save file",
        ));
    }

    let path = format!("{}/{}", kind.directory(), filename);
    tracing::info!(
        account = account.id,
        ?kind,
        size = bytes.len(),
        "image uploaded: {}",
        path
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            url: crate::views::media_url(&path),
            path,
            size: bytes.len(),
            mime_type: mime_type.to_string(),
        }),
    ))
}
