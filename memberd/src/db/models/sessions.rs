//! Database models for sessions.

use crate::types::{SessionId, UserId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A row from the `sessions` table: a revocable record of an issued token.
///
/// Token validity is established by signature and expiry verification; this
/// row exists so logout can revoke a token before its embedded expiry.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Database request for recording an issued token
#[derive(Debug, Clone)]
pub struct SessionCreateDBRequest {
    pub user_id: UserId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}
