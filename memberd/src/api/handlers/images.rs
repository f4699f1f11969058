use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    api::models::images::{GetImageQuery, ImageDeleteResponse, ImageResponse, UploadResponse},
    api::models::users::CurrentUser,
    db::{handlers::Images, models::images::ImageUpsertDBRequest},
    errors::Error,
    types::UserId,
};

/// Number of image slots every user gets
pub const IMAGE_SLOTS: i32 = 5;

/// List the authenticated user's images, ordered by slot number
#[utoipa::path(
    get,
    path = "/images/my-images",
    tag = "images",
    responses(
        (status = 200, description = "Up to five images", body = [ImageResponse]),
        (status = 401, description = "Missing or invalid token"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn my_images(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<Vec<ImageResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut images_repo = Images::new(&mut conn);

    let images = images_repo.list_for_user(current_user.id).await?;

    Ok(Json(images.into_iter().map(ImageResponse::from).collect()))
}

/// Upload up to five images in a single multipart submission.
///
/// Parts must be named `image_1` .. `image_5`; empty parts and unknown names
/// are skipped. Validation failures are slot-scoped and abort the request;
/// slots already written in the same request are not rolled back.
#[utoipa::path(
    post,
    path = "/images/upload",
    tag = "images",
    request_body(content_type = "multipart/form-data", description = "Image files in fields image_1..image_5"),
    responses(
        (status = 200, description = "Uploaded images", body = UploadResponse),
        (status = 400, description = "Wrong content type, oversized slot, or nothing to upload"),
        (status = 401, description = "Missing or invalid token"),
        (status = 500, description = "Object store failure"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn upload_images(
    State(state): State<AppState>,
    current_user: CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, Error> {
    let max_image_size = state.config.uploads.max_image_size;
    let mut uploaded: Vec<ImageResponse> = Vec::new();

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut images_repo = Images::new(&mut conn);

    while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("Failed to parse multipart data: {e}"),
    })? {
        // Only fields named image_1..image_5 participate
        let slot = match field.name().and_then(parse_slot_name) {
            Some(slot) => slot,
            None => continue,
        };

        let content_type = field.content_type().map(|s| s.to_string());
        let file_name = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("image_{slot}"));

        let bytes = field.bytes().await.map_err(|e| Error::BadRequest {
            message: format!("Failed to read image {slot}: {e}"),
        })?;

        // An empty part is an unpopulated slot, not an error
        if bytes.is_empty() {
            continue;
        }

        let content_type = match content_type {
            Some(ct) if ct.starts_with("image/") => ct,
            _ => {
                return Err(Error::BadRequest {
                    message: format!("Image {slot}: an image file is required"),
                });
            }
        };

        if bytes.len() as u64 > max_image_size {
            return Err(Error::BadRequest {
                message: format!(
                    "Image {slot}: file is too large (max {} MB)",
                    max_image_size / (1024 * 1024)
                ),
            });
        }

        // Deterministic object path: re-uploading a slot overwrites in place
        let extension = extension_for_content_type(&content_type);
        let file_path = format!(
            "users/{}/user_{}_{:02}.{}",
            current_user.id, current_user.id, slot, extension
        );

        // Object first, metadata second. A crash between the two leaves an
        // orphaned object; a metadata row without bytes reads as 404.
        state.storage.put(&file_path, &bytes).await.map_err(|e| {
            tracing::error!("Object store write failed for image {slot}: {e:#}");
            Error::Internal {
                operation: format!("store image {slot}"),
            }
        })?;

        let image = images_repo
            .upsert(&ImageUpsertDBRequest {
                user_id: current_user.id,
                image_number: slot,
                file_name,
                file_path,
                file_size: Some(bytes.len() as i64),
                mime_type: Some(content_type),
            })
            .await?;

        uploaded.push(ImageResponse::from(image));
    }

    if uploaded.is_empty() {
        return Err(Error::BadRequest {
            message: "No images were provided to upload".to_string(),
        });
    }

    let message = format!("{} image(s) uploaded", uploaded.len());
    Ok(Json(UploadResponse { uploaded, message }))
}

/// Delete one image slot
#[utoipa::path(
    delete,
    path = "/images/{image_number}",
    tag = "images",
    params(("image_number" = i32, Path, description = "Slot number, 1-5")),
    responses(
        (status = 200, description = "Slot cleared (also when it was already empty)", body = ImageDeleteResponse),
        (status = 400, description = "Slot number out of range"),
        (status = 401, description = "Missing or invalid token"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id, image_number))]
pub async fn delete_image(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(image_number): Path<i32>,
) -> Result<Json<ImageDeleteResponse>, Error> {
    if !(1..=IMAGE_SLOTS).contains(&image_number) {
        return Err(Error::BadRequest {
            message: format!("Image number must be between 1 and {IMAGE_SLOTS}"),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut images_repo = Images::new(&mut conn);

    if let Some(image) = images_repo.get_slot(current_user.id, image_number).await? {
        // Object removal is best-effort; metadata deletion proceeds either way
        if let Err(e) = state.storage.delete(&image.file_path).await {
            tracing::warn!("Failed to delete object at {}: {e:#}", image.file_path);
        }
        images_repo.delete_slot(current_user.id, image_number).await?;
    }

    Ok(Json(ImageDeleteResponse {
        message: "Image deleted".to_string(),
    }))
}

/// Fetch the raw bytes of one image slot.
///
/// Admin identities may pass `?user_id=` to read another user's slot; for
/// everyone else the parameter is ignored.
#[utoipa::path(
    get,
    path = "/images/{image_number}",
    tag = "images",
    params(
        ("image_number" = i32, Path, description = "Slot number, 1-5"),
        GetImageQuery,
    ),
    responses(
        (status = 200, description = "Raw image bytes with a 24h cache header"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Out-of-range slot, empty slot, or missing object"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id, image_number))]
pub async fn get_image(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(image_number): Path<i32>,
    Query(query): Query<GetImageQuery>,
) -> Result<Response, Error> {
    let not_found = || Error::NotFound {
        resource: "Image".to_string(),
        id: image_number.to_string(),
    };

    if !(1..=IMAGE_SLOTS).contains(&image_number) {
        return Err(not_found());
    }

    let owner: UserId = match query.user_id {
        Some(requested) if current_user.is_admin => requested,
        _ => current_user.id,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut images_repo = Images::new(&mut conn);

    let image = images_repo.get_slot(owner, image_number).await?.ok_or_else(not_found)?;

    // A dangling metadata row (object lost) is indistinguishable from an
    // empty slot as far as the client is concerned
    let bytes = state.storage.get(&image.file_path).await.map_err(|_| not_found())?;

    let content_type = image
        .mime_type
        .clone()
        .unwrap_or_else(|| mime_guess::from_path(&image.file_path).first_or_octet_stream().to_string());

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "public, max-age=86400".to_string()),
        ],
        bytes,
    )
        .into_response())
}

/// Parse a multipart field name of the form `image_N` into a slot number
fn parse_slot_name(name: &str) -> Option<i32> {
    let slot: i32 = name.strip_prefix("image_")?.parse().ok()?;
    (1..=IMAGE_SLOTS).contains(&slot).then_some(slot)
}

/// Derive a file extension from an image content type, e.g. "image/png" -> "png"
fn extension_for_content_type(content_type: &str) -> String {
    let subtype = content_type.split('/').nth(1).unwrap_or("bin");
    // e.g. "svg+xml" -> "svg"
    subtype.split('+').next().unwrap_or(subtype).to_string()
}
