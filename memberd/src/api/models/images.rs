//! API request/response models for images.

use crate::db::models::images::Image;
use crate::types::{ImageId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImageResponse {
    pub id: ImageId,
    pub user_id: UserId,
    /// Slot number, 1-5
    pub image_number: i32,
    /// Original client-supplied file name
    pub file_name: String,
    /// Opaque locator into the object store
    pub file_path: String,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Image> for ImageResponse {
    fn from(db: Image) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            image_number: db.image_number,
            file_name: db.file_name,
            file_path: db.file_path,
            file_size: db.file_size,
            mime_type: db.mime_type,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Response after a multipart upload, enumerating the slots that succeeded
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub uploaded: Vec<ImageResponse>,
    pub message: String,
}

/// Response after deleting an image slot
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImageDeleteResponse {
    pub message: String,
}

/// Query parameters for fetching image bytes
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct GetImageQuery {
    /// Read another user's slot. Honored only for admin identities;
    /// everyone else always reads their own images.
    pub user_id: Option<UserId>,
}
