//! Upload API endpoints
//!
//! - POST /api/upload/image - Store a post header image
//!
//! Images land in `<media.root>/blog_images/` under a random name. The
//! returned `url` is what clients put in a post's `image` field.
//!
//! The stored extension is derived from the image type, never from the
//! client's filename, and the file's leading bytes must match that type.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::fs;
use uuid::Uuid;

use crate::api::middleware::{ApiError, AppState};

/// Subdirectory of the media root that post images are written to
pub const IMAGE_DIR: &str = "blog_images";

/// Room for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// Response for successful upload
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
    pub filename: String,
    pub size: u64,
    pub content_type: String,
}

/// Build the upload router. Request bodies are capped just above `max_file_size`.
pub fn router(max_file_size: u64) -> Router<AppState> {
    let limit = usize::try_from(max_file_size.saturating_add(MULTIPART_OVERHEAD))
        .unwrap_or(usize::MAX);
    let upload = post(upload_image).layer(DefaultBodyLimit::max(limit));

    Router::new()
        .route("/api/upload/image", upload.clone())
        .route("/api/upload/image/", upload)
}

/// POST /api/upload/image - Upload a single image
///
/// Accepts multipart/form-data with a file field named "file".
async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let config = &state.media;
    let dir = config.root.join(IMAGE_DIR);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation_error(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        if !config.is_type_allowed(&content_type) {
            return Err(ApiError::validation_error(format!(
                "Invalid file type: {}. Allowed types: {}",
                content_type,
                config.allowed_types.join(", ")
            )));
        }
        let extension = extension_for(&content_type).ok_or_else(|| {
            ApiError::validation_error(format!("Unsupported image type: {}", content_type))
        })?;

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation_error(format!("Failed to read file: {}", e)))?;

        if data.len() as u64 > config.max_file_size {
            return Err(ApiError::validation_error(format!(
                "File too large. Maximum size: {} bytes",
                config.max_file_size
            )));
        }

        if sniff_image_type(&data) != Some(content_type.as_str()) {
            return Err(ApiError::validation_error(format!(
                "File content is not a valid {} image",
                content_type
            )));
        }

        fs::create_dir_all(&dir)
            .await
            .map_err(|e| ApiError::internal_error(format!("Failed to create media dir: {}", e)))?;

        let stored_name = format!("{}.{}", Uuid::new_v4(), extension);
        fs::write(dir.join(&stored_name), &data)
            .await
            .map_err(|e| ApiError::internal_error(format!("Failed to save file: {}", e)))?;

        tracing::info!("Stored upload {} ({} bytes)", stored_name, data.len());

        return Ok(Json(UploadResponse {
            url: format!("{}/{}/{}", config.url_prefix(), IMAGE_DIR, stored_name),
            filename: stored_name,
            size: data.len() as u64,
            content_type,
        }));
    }

    Err(ApiError::validation_error("No file provided"))
}

/// Extension stored for an image MIME type
fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Detect the image MIME type from the file signature
fn sniff_image_type(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}
