//! API request/response models for users.

use crate::db::models::users::User;
use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The resolved identity attached to an authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
    /// Admin capability, resolved from the configured allow-list
    pub is_admin: bool,
}

/// Request to update the caller's own profile. Omitted fields are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub message: Option<String>,
}

// User response models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub order_number: String,
    pub email: String,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// The password hash stops here: the row type is not serializable and the
// response type has no field for it.
impl From<User> for UserResponse {
    fn from(db: User) -> Self {
        Self {
            id: db.id,
            name: db.name,
            order_number: db.order_number,
            email: db.email,
            message: db.message,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_response_never_contains_hash() {
        let row = User {
            id: 1,
            name: "n".to_string(),
            order_number: "ORD-1".to_string(),
            email: "e@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            message: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(UserResponse::from(row)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(!json.to_string().contains("argon2id"));
    }
}
