//! Administrative views over all users and images.
//!
//! Every handler here takes the [`AdminUser`] extractor, so a valid session
//! without the admin capability is rejected with 403 before any query runs.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    AppState,
    api::models::{
        admin::{AdminImageResponse, StatsResponse, UserDetailResponse},
        images::ImageResponse,
        users::UserResponse,
    },
    auth::current_user::AdminUser,
    db::handlers::{Images, Repository, Users, users::UserFilter},
    errors::Error,
    types::UserId,
};

/// List all users, newest first
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "admin",
    responses(
        (status = 200, description = "All users", body = [UserResponse]),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not an admin"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_users(State(state): State<AppState>, AdminUser(_admin): AdminUser) -> Result<Json<Vec<UserResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut conn);

    let users = user_repo.list(&UserFilter::default()).await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// List all images with their owners, newest first
#[utoipa::path(
    get,
    path = "/admin/images",
    tag = "admin",
    responses(
        (status = 200, description = "All images with owner details", body = [AdminImageResponse]),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not an admin"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_images(State(state): State<AppState>, AdminUser(_admin): AdminUser) -> Result<Json<Vec<AdminImageResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut images_repo = Images::new(&mut conn);

    let images = images_repo.list_all_with_owner().await?;

    Ok(Json(images.into_iter().map(AdminImageResponse::from).collect()))
}

/// One user's profile and everything they have uploaded
#[utoipa::path(
    get,
    path = "/admin/users/{user_id}",
    tag = "admin",
    params(("user_id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User detail", body = UserDetailResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "No such user"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id))]
pub async fn get_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(user_id): Path<UserId>,
) -> Result<Json<UserDetailResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let mut user_repo = Users::new(&mut conn);
    let user = user_repo.get_by_id(user_id).await?.ok_or_else(|| Error::NotFound {
        resource: "User".to_string(),
        id: user_id.to_string(),
    })?;

    let mut images_repo = Images::new(&mut conn);
    let images = images_repo.list_for_user(user_id).await?;

    Ok(Json(UserDetailResponse {
        user: UserResponse::from(user),
        images: images.into_iter().map(ImageResponse::from).collect(),
    }))
}

/// System-wide aggregates
#[utoipa::path(
    get,
    path = "/admin/stats",
    tag = "admin",
    responses(
        (status = 200, description = "Aggregate counts", body = StatsResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not an admin"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn stats(State(state): State<AppState>, AdminUser(_admin): AdminUser) -> Result<Json<StatsResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let mut user_repo = Users::new(&mut conn);
    let total_users = user_repo.count().await?;
    let today_new_users = user_repo.count_created_today().await?;

    let mut images_repo = Images::new(&mut conn);
    let total_images = images_repo.count().await?;
    let today_new_images = images_repo.count_created_today().await?;
    let users_with_images = images_repo.count_distinct_owners().await?;

    Ok(Json(StatsResponse {
        total_users,
        total_images,
        today_new_users,
        today_new_images,
        users_with_images,
    }))
}
