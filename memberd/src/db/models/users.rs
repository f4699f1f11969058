//! Database models for users.

use crate::types::UserId;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A row from the `users` table.
///
/// Deliberately not `Serialize`: the password hash must never reach a client,
/// so handlers convert to [`crate::api::models::users::UserResponse`] instead.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub order_number: String,
    pub email: String,
    pub password_hash: String,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database request for creating a new user
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub name: String,
    pub order_number: String,
    pub email: String,
    pub password_hash: String,
    pub message: Option<String>,
}

/// Database request for updating a user.
///
/// Omitted fields are left untouched. Email, order number and password are
/// immutable through the exposed contract, so they don't appear here.
#[derive(Debug, Clone, Default)]
pub struct UserUpdateDBRequest {
    pub name: Option<String>,
    pub message: Option<String>,
}
