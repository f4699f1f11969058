//! Database repository for image metadata.
//!
//! Images are keyed by (user, slot number 1-5) rather than by row ID, so this
//! repository exposes slot-oriented methods instead of the base
//! [`crate::db::handlers::Repository`] trait.

use crate::db::{
    errors::Result,
    models::images::{Image, ImageUpsertDBRequest, ImageWithOwner},
};
use crate::types::UserId;
use sqlx::PgConnection;
use tracing::instrument;

pub struct Images<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Images<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// All slots a user has populated, ordered by slot number. At most 5 rows.
    #[instrument(skip(self), err)]
    pub async fn list_for_user(&mut self, user_id: UserId) -> Result<Vec<Image>> {
        let images = sqlx::query_as::<_, Image>("SELECT * FROM images WHERE user_id = $1 ORDER BY image_number")
            .bind(user_id)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(images)
    }

    #[instrument(skip(self), err)]
    pub async fn get_slot(&mut self, user_id: UserId, image_number: i32) -> Result<Option<Image>> {
        let image = sqlx::query_as::<_, Image>("SELECT * FROM images WHERE user_id = $1 AND image_number = $2")
            .bind(user_id)
            .bind(image_number)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(image)
    }

    /// Insert-or-replace keyed on (user_id, image_number).
    ///
    /// A prior row for the slot is fully overwritten. The old object is not
    /// deleted here; overwriting the object is the caller's responsibility
    /// before this is called.
    #[instrument(skip(self, request), fields(user_id = request.user_id, image_number = request.image_number), err)]
    pub async fn upsert(&mut self, request: &ImageUpsertDBRequest) -> Result<Image> {
        let image = sqlx::query_as::<_, Image>(
            r#"
            INSERT INTO images (user_id, image_number, file_name, file_path, file_size, mime_type)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, image_number) DO UPDATE SET
                file_name = EXCLUDED.file_name,
                file_path = EXCLUDED.file_path,
                file_size = EXCLUDED.file_size,
                mime_type = EXCLUDED.mime_type,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(request.user_id)
        .bind(request.image_number)
        .bind(&request.file_name)
        .bind(&request.file_path)
        .bind(request.file_size)
        .bind(&request.mime_type)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(image)
    }

    /// Remove the metadata row for a slot. Returns false (not an error) when
    /// the slot was already empty.
    #[instrument(skip(self), err)]
    pub async fn delete_slot(&mut self, user_id: UserId, image_number: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM images WHERE user_id = $1 AND image_number = $2")
            .bind(user_id)
            .bind(image_number)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Every image joined with its owner's identifying fields, newest first.
    #[instrument(skip(self), err)]
    pub async fn list_all_with_owner(&mut self) -> Result<Vec<ImageWithOwner>> {
        let images = sqlx::query_as::<_, ImageWithOwner>(
            r#"
            SELECT
                i.id,
                i.user_id,
                i.image_number,
                i.file_name,
                i.file_path,
                i.file_size,
                i.mime_type,
                i.created_at,
                i.updated_at,
                u.name AS user_name,
                u.email AS user_email,
                u.order_number AS user_order_number
            FROM images i
            JOIN users u ON i.user_id = u.id
            ORDER BY i.created_at DESC
            "#,
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(images)
    }

    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM images")
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }

    #[instrument(skip(self), err)]
    pub async fn count_created_today(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM images WHERE created_at::date = CURRENT_DATE")
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }

    /// Number of distinct users that have at least one image.
    #[instrument(skip(self), err)]
    pub async fn count_distinct_owners(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT user_id) FROM images")
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::{Repository, Users};
    use crate::test_utils::test_user_create_request;
    use sqlx::PgPool;

    async fn seed_user(pool: &PgPool, order_number: &str, email: &str) -> UserId {
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);
        users
            .create(&test_user_create_request("owner", order_number, email))
            .await
            .unwrap()
            .id
    }

    fn upsert_request(user_id: UserId, slot: i32, file_name: &str) -> ImageUpsertDBRequest {
        ImageUpsertDBRequest {
            user_id,
            image_number: slot,
            file_name: file_name.to_string(),
            file_path: format!("users/{user_id}/user_{user_id}_{slot:02}.jpeg"),
            file_size: Some(2048),
            mime_type: Some("image/jpeg".to_string()),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_upsert_replaces_slot(pool: PgPool) {
        let user_id = seed_user(&pool, "ORD-001", "o@example.com").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Images::new(&mut conn);

        let first = repo.upsert(&upsert_request(user_id, 3, "first.jpg")).await.unwrap();
        let second = repo.upsert(&upsert_request(user_id, 3, "second.jpg")).await.unwrap();

        // Replaced in place: same row, new metadata
        assert_eq!(first.id, second.id);
        assert_eq!(second.file_name, "second.jpg");

        let images = repo.list_for_user(user_id).await.unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].image_number, 3);
        assert_eq!(images[0].file_name, "second.jpg");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_for_user_ordered_by_slot(pool: PgPool) {
        let user_id = seed_user(&pool, "ORD-001", "o@example.com").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Images::new(&mut conn);

        for slot in [4, 1, 5] {
            repo.upsert(&upsert_request(user_id, slot, "f.jpg")).await.unwrap();
        }

        let images = repo.list_for_user(user_id).await.unwrap();
        let slots: Vec<i32> = images.iter().map(|i| i.image_number).collect();
        assert_eq!(slots, vec![1, 4, 5]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_absent_slot_is_noop(pool: PgPool) {
        let user_id = seed_user(&pool, "ORD-001", "o@example.com").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Images::new(&mut conn);

        assert!(!repo.delete_slot(user_id, 4).await.unwrap());

        repo.upsert(&upsert_request(user_id, 4, "f.jpg")).await.unwrap();
        assert!(repo.delete_slot(user_id, 4).await.unwrap());
        assert!(repo.list_for_user(user_id).await.unwrap().is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_all_with_owner(pool: PgPool) {
        let first = seed_user(&pool, "ORD-001", "first@example.com").await;
        let second = seed_user(&pool, "ORD-002", "second@example.com").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Images::new(&mut conn);

        repo.upsert(&upsert_request(first, 1, "a.jpg")).await.unwrap();
        repo.upsert(&upsert_request(second, 2, "b.jpg")).await.unwrap();

        let all = repo.list_all_with_owner().await.unwrap();
        assert_eq!(all.len(), 2);
        for pair in all.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
        let owners: Vec<&str> = all.iter().map(|i| i.user_email.as_str()).collect();
        assert!(owners.contains(&"first@example.com"));
        assert!(owners.contains(&"second@example.com"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_stat_counts(pool: PgPool) {
        let first = seed_user(&pool, "ORD-001", "first@example.com").await;
        let _empty = seed_user(&pool, "ORD-002", "second@example.com").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Images::new(&mut conn);

        repo.upsert(&upsert_request(first, 1, "a.jpg")).await.unwrap();
        repo.upsert(&upsert_request(first, 2, "b.jpg")).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 2);
        assert_eq!(repo.count_created_today().await.unwrap(), 2);
        assert_eq!(repo.count_distinct_owners().await.unwrap(), 1);
    }
}
