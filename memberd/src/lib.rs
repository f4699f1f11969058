//! # memberd: Membership & Image Management Backend
//!
//! `memberd` is a small backend for membership registration and per-user
//! image management. Users register with basic profile fields (name, a
//! business order number, email), log in via signed session tokens carried in
//! an HttpOnly cookie, and upload up to five images each. A separate
//! administrative surface exposes aggregate views over all users and images.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer and uses PostgreSQL via SQLx for relational state. Binary
//! image payloads live outside the database, behind the
//! [`db::handlers::object_store::ObjectStore`] gateway (a filesystem
//! implementation ships by default); the `images` table records a locator
//! path per slot. The two stores are deliberately not transactionally linked:
//! the upload pipeline writes the object first and the metadata row second,
//! and a metadata row whose object has gone missing reads as not-found.
//!
//! ### Request Flow
//!
//! Every authenticated request resolves its identity through the
//! [`auth::current_user::CurrentUser`] extractor: session cookie → JWT
//! signature and expiry verification → a revocation check against the
//! `sessions` table (logout deletes the row, which invalidates otherwise
//! still-valid tokens). Admin routes additionally require the identity's
//! email to be on the configured allow-list, surfaced as an `is_admin`
//! capability on the resolved identity.
//!
//! Handlers are request-scoped and sequential: no background tasks, no
//! long-lived in-process state beyond the connection pool, configuration and
//! the object store handle.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use memberd::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = memberd::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     memberd::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! The application requires a PostgreSQL database and automatically runs
//! migrations on startup:
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
//! memberd::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
mod types;

#[cfg(test)]
pub mod test_utils;

use crate::db::handlers::object_store::{ObjectStore, create_object_store};
use crate::openapi::ApiDoc;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::{
    Router,
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{ImageId, Operation, SessionId, UserId};

/// Application state shared across all request handlers.
///
/// # Fields
///
/// - `db`: PostgreSQL connection pool
/// - `config`: Application configuration loaded from file/environment
/// - `storage`: Binary object store for uploaded images
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub storage: Arc<dyn ObjectStore>,
}

/// Get the memberd database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.auth.cors.allowed_origins {
        origins.push(origin.parse::<HeaderValue>()?);
    }

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(config.auth.cors.allow_credentials)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]))
}

/// Build the application router with all endpoints and middleware.
///
/// This constructs the complete Axum router with:
/// - Authentication routes (register, login, logout)
/// - Profile routes (`/users/me`)
/// - Image routes (five-slot upload, listing, fetch, delete)
/// - Admin routes (aggregate views, allow-list gated)
/// - API docs at `/docs`
/// - CORS and tracing middleware
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    // The upload route accepts up to five images in one submission; the body
    // limit leaves headroom for multipart framing on top of the slot caps
    let upload_body_limit =
        (state.config.uploads.max_image_size as usize) * (api::handlers::images::IMAGE_SLOTS as usize) + 256 * 1024;

    let auth_routes = Router::new()
        .route("/auth/register", post(api::handlers::auth::register))
        .route("/auth/login", post(api::handlers::auth::login))
        .route("/auth/logout", post(api::handlers::auth::logout));

    let user_routes = Router::new().route(
        "/users/me",
        get(api::handlers::users::get_me).put(api::handlers::users::update_me),
    );

    let image_routes = Router::new()
        .route("/images/my-images", get(api::handlers::images::my_images))
        .route(
            "/images/upload",
            post(api::handlers::images::upload_images).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .route(
            "/images/{image_number}",
            get(api::handlers::images::get_image).delete(api::handlers::images::delete_image),
        );

    let admin_routes = Router::new()
        .route("/admin/users", get(api::handlers::admin::list_users))
        .route("/admin/users/{user_id}", get(api::handlers::admin::get_user))
        .route("/admin/images", get(api::handlers::admin::list_images))
        .route("/admin/stats", get(api::handlers::admin::stats));

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .merge(auth_routes)
        .merge(user_routes)
        .merge(image_routes)
        .merge(admin_routes)
        .with_state(state.clone())
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    // Create CORS layer from config
    let cors_layer = create_cors_layer(&state.config)?;

    // Add tracing layer
    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] connects to the database, runs
///    migrations, and prepares the object store
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and handles
///    requests until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting memberd with configuration: {:#?}", config);

        let pool_settings = &config.database.pool;
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(pool_settings.max_connections)
            .min_connections(pool_settings.min_connections)
            .acquire_timeout(Duration::from_secs(pool_settings.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(pool_settings.idle_timeout_secs))
            .connect(&config.database.url)
            .await?;

        migrator().run(&pool).await?;

        let storage = create_object_store(&config.storage.path).await?;

        let state = AppState::builder().db(pool.clone()).config(config.clone()).storage(storage).build();

        let router = build_router(&state)?;

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "memberd listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        // Close database connections
        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
