//! Database repository for users.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::users::{User, UserCreateDBRequest, UserUpdateDBRequest},
};
use crate::types::UserId;
use sqlx::PgConnection;
use tracing::instrument;

/// Filter for listing users
#[derive(Debug, Clone)]
pub struct UserFilter {
    pub skip: i64,
    pub limit: i64,
}

impl UserFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }
}

impl Default for UserFilter {
    fn default() -> Self {
        Self { skip: 0, limit: 1000 }
    }
}

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Response = User;
    type Id = UserId;
    type Filter = UserFilter;

    #[instrument(skip(self, request), fields(email = %request.email), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, order_number, email, password_hash, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.order_number)
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(&request.message)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2")
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(users)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // Atomic update with conditional field updates
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                message = COALESCE($3, message),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.message)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(user)
    }
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Fetch a user by email.
    ///
    /// This is the only accessor handlers should use on the login path; the
    /// returned row carries the password hash.
    #[instrument(skip(self, email), err)]
    pub async fn get_by_email(&mut self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self, order_number), err)]
    pub async fn get_by_order_number(&mut self, order_number: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE order_number = $1")
            .bind(order_number)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }

    #[instrument(skip(self), err)]
    pub async fn count_created_today(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE created_at::date = CURRENT_DATE")
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::super::repository::Repository;
    use super::*;
    use crate::test_utils::test_user_create_request;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_user(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let user = repo
            .create(&test_user_create_request("Taro", "ORD-001", "taro@example.com"))
            .await
            .unwrap();

        assert_eq!(user.name, "Taro");
        assert_eq!(user.order_number, "ORD-001");
        assert_eq!(user.email, "taro@example.com");
        assert!(user.id > 0);
        assert_eq!(user.created_at, user.updated_at);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_email_rejected_by_constraint(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        repo.create(&test_user_create_request("A", "ORD-001", "dup@example.com"))
            .await
            .unwrap();

        // Same email, different order number: the constraint is the backstop
        let err = repo
            .create(&test_user_create_request("B", "ORD-002", "dup@example.com"))
            .await
            .unwrap_err();

        match err {
            DbError::UniqueViolation { constraint, .. } => {
                assert!(constraint.unwrap().contains("email"));
            }
            other => panic!("expected unique violation, got {other:?}"),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_order_number_rejected_by_constraint(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        repo.create(&test_user_create_request("A", "ORD-001", "a@example.com"))
            .await
            .unwrap();

        let err = repo
            .create(&test_user_create_request("B", "ORD-001", "b@example.com"))
            .await
            .unwrap_err();

        match err {
            DbError::UniqueViolation { constraint, .. } => {
                assert!(constraint.unwrap().contains("order_number"));
            }
            other => panic!("expected unique violation, got {other:?}"),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_by_email_and_order_number(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let created = repo
            .create(&test_user_create_request("Hana", "ORD-042", "hana@example.com"))
            .await
            .unwrap();

        let by_email = repo.get_by_email("hana@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);
        assert!(!by_email.password_hash.is_empty());

        let by_order = repo.get_by_order_number("ORD-042").await.unwrap().unwrap();
        assert_eq!(by_order.id, created.id);

        assert!(repo.get_by_email("nobody@example.com").await.unwrap().is_none());
        assert!(repo.get_by_order_number("ORD-999").await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_partial_update(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let created = repo
            .create(&test_user_create_request("Old Name", "ORD-001", "u@example.com"))
            .await
            .unwrap();

        // Only the name changes; message stays untouched
        let updated = repo
            .update(
                created.id,
                &UserUpdateDBRequest {
                    name: Some("New Name".to_string()),
                    message: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "New Name");
        assert_eq!(updated.message, created.message);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.email, created.email);

        // A no-op update still succeeds
        let noop = repo.update(created.id, &UserUpdateDBRequest::default()).await.unwrap();
        assert_eq!(noop.name, "New Name");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_missing_user(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let err = repo.update(4242, &UserUpdateDBRequest::default()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_newest_first(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        for i in 0..3 {
            repo.create(&test_user_create_request(
                &format!("user{i}"),
                &format!("ORD-{i}"),
                &format!("user{i}@example.com"),
            ))
            .await
            .unwrap();
        }

        let users = repo.list(&UserFilter::default()).await.unwrap();
        assert_eq!(users.len(), 3);
        for pair in users.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_and_counts(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let user = repo
            .create(&test_user_create_request("X", "ORD-001", "x@example.com"))
            .await
            .unwrap();

        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(repo.count_created_today().await.unwrap(), 1);

        assert!(repo.delete(user.id).await.unwrap());
        assert!(!repo.delete(user.id).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
