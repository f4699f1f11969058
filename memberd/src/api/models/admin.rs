//! API response models for the administrative surface.

use crate::api::models::{images::ImageResponse, users::UserResponse};
use crate::db::models::images::ImageWithOwner;
use crate::types::{ImageId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An image with its owner's identifying fields, for the admin listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminImageResponse {
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

impl From<ImageWithOwner> for AdminImageResponse {
    fn from(db: ImageWithOwner) -> Self {
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
            user_name: db.user_name,
            user_email: db.user_email,
            user_order_number: db.user_order_number,
        }
    }
}

/// One user plus everything they have uploaded
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserDetailResponse {
    pub user: UserResponse,
    pub images: Vec<ImageResponse>,
}

/// System-wide aggregates
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub total_users: i64,
    pub total_images: i64,
    pub today_new_users: i64,
    pub today_new_images: i64,
    pub users_with_images: i64,
}
