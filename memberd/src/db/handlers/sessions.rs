//! Database repository for sessions.
//!
//! A session row records an issued token so it can be revoked server-side.
//! Token verification consults [`Sessions::find_active`]: a structurally
//! valid token whose row has been deleted (logout) or has expired is rejected.

use crate::db::{
    errors::Result,
    models::sessions::{Session, SessionCreateDBRequest},
};
use crate::types::UserId;
use sqlx::PgConnection;
use tracing::instrument;

pub struct Sessions<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Sessions<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(user_id = request.user_id), err)]
    pub async fn create(&mut self, request: &SessionCreateDBRequest) -> Result<Session> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (user_id, token, expires_at)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(request.user_id)
        .bind(&request.token)
        .bind(request.expires_at)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(session)
    }

    /// The session for a token, if one exists and has not passed its expiry.
    #[instrument(skip(self, token), err)]
    pub async fn find_active(&mut self, token: &str) -> Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE token = $1 AND expires_at > NOW()")
            .bind(token)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(session)
    }

    /// Delete the session recorded for a token. Returns false when no such
    /// session existed, which logout treats as success.
    #[instrument(skip(self, token), err)]
    pub async fn delete_by_token(&mut self, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Drop a user's expired sessions. Called opportunistically on login.
    #[instrument(skip(self), err)]
    pub async fn purge_expired(&mut self, user_id: UserId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1 AND expires_at <= NOW()")
            .bind(user_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected())
    }
}
