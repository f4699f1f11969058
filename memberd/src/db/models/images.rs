//! Database models for images.

use crate::types::{ImageId, UserId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A row from the `images` table: one of up to five slots per user.
#[derive(Debug, Clone, FromRow)]
pub struct Image {
    pub id: ImageId,
    pub user_id: UserId,
    pub image_number: i32,
    pub file_name: String,
    pub file_path: String,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database request for inserting or replacing an image slot
#[derive(Debug, Clone)]
pub struct ImageUpsertDBRequest {
    pub user_id: UserId,
    pub image_number: i32,
    pub file_name: String,
    pub file_path: String,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
}

/// An image row joined with its owner's identifying fields (admin listing)
#[derive(Debug, Clone, FromRow)]
pub struct ImageWithOwner {
    pub id: ImageId,
    pub user_id: UserId,
    pub image_number: i32,
    pub file_name: String,
    pub file_path: String,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_name: String,
    pub user_email: String,
    pub user_order_number: String,
}
