//! OpenAPI document for the HTTP surface, served through Scalar at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "memberd",
        description = "Membership registration and per-user image management backend"
    ),
    paths(
        crate::api::handlers::auth::register,
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::logout,
        crate::api::handlers::users::get_me,
        crate::api::handlers::users::update_me,
        crate::api::handlers::images::my_images,
        crate::api::handlers::images::upload_images,
        crate::api::handlers::images::get_image,
        crate::api::handlers::images::delete_image,
        crate::api::handlers::admin::list_users,
        crate::api::handlers::admin::get_user,
        crate::api::handlers::admin::list_images,
        crate::api::handlers::admin::stats,
    ),
    components(schemas(
        crate::api::models::auth::RegisterRequest,
        crate::api::models::auth::LoginRequest,
        crate::api::models::auth::AuthResponse,
        crate::api::models::auth::AuthSuccessResponse,
        crate::api::models::users::UserResponse,
        crate::api::models::users::UserUpdate,
        crate::api::models::users::CurrentUser,
        crate::api::models::images::ImageResponse,
        crate::api::models::images::UploadResponse,
        crate::api::models::images::ImageDeleteResponse,
        crate::api::models::admin::AdminImageResponse,
        crate::api::models::admin::UserDetailResponse,
        crate::api::models::admin::StatsResponse,
    )),
    tags(
        (name = "auth", description = "Registration, login and logout"),
        (name = "users", description = "The caller's own profile"),
        (name = "images", description = "Per-user image slots"),
        (name = "admin", description = "Administrative views"),
    )
)]
pub struct ApiDoc;
