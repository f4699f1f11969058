//! Shared helpers for tests: config, app state, seeded users and sessions.

use crate::{
    AppState,
    api::models::{auth::AuthResponse, users::CurrentUser, users::UserResponse},
    auth::{password, session},
    config::{AuthConfig, Config, SessionConfig, UploadConfig},
    db::{
        handlers::{Repository, Sessions, Users, object_store::create_object_store},
        models::{sessions::SessionCreateDBRequest, users::User, users::UserCreateDBRequest},
    },
    types::UserId,
};
use axum::http::StatusCode;
use axum_test::{TestServer, TestServerConfig};
use chrono::Utc;
use sqlx::PgPool;

/// Config with a signing key, a 1 MiB upload cap, and admin@example.com on
/// the allow-list. Each call gets its own object-store directory.
pub fn create_test_config() -> Config {
    Config {
        secret_key: Some("test-secret-key-for-jwt".to_string()),
        auth: AuthConfig {
            admin_emails: vec!["admin@example.com".to_string()],
            // Tests run over plain HTTP; a Secure cookie would never round-trip
            session: SessionConfig {
                cookie_secure: false,
                ..Default::default()
            },
            ..Default::default()
        },
        uploads: UploadConfig {
            max_image_size: 1024 * 1024,
        },
        storage: crate::config::StorageConfig {
            path: tempfile::tempdir().expect("create temp storage dir").keep(),
        },
        ..Default::default()
    }
}

pub async fn create_test_app_state(pool: PgPool) -> AppState {
    let config = create_test_config();
    let storage = create_object_store(&config.storage.path)
        .await
        .expect("create test object store");

    AppState::builder().db(pool).config(config).storage(storage).build()
}

/// A test server over the full router, with cookie persistence so that
/// register/login flows carry the session to subsequent requests.
pub async fn create_test_server(pool: PgPool) -> TestServer {
    let state = create_test_app_state(pool).await;
    let router = crate::build_router(&state).expect("build test router");

    let server_config = TestServerConfig { save_cookies: true, ..Default::default() };
    TestServer::new_with_config(router, server_config).expect("Failed to create test server")
}

/// Register a user over HTTP with the fixed password "password123".
/// Leaves that user's session cookie active on the server.
pub async fn register_user(server: &TestServer, name: &str, order_number: &str, email: &str) -> UserResponse {
    let response = server
        .post("/auth/register")
        .json(&serde_json::json!({
            "name": name,
            "order_number": order_number,
            "email": email,
            "password": "password123",
        }))
        .await;
    response.assert_status(StatusCode::OK);

    let body: AuthResponse = response.json();
    body.user
}

/// Cheap Argon2 parameters so repository tests don't burn CPU on hashing
fn test_hash(password_plain: &str) -> String {
    password::hash_string_with_params(
        password_plain,
        Some(password::Argon2Params {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }),
    )
    .expect("hash test password")
}

/// Create request for seeding users straight through the repository
pub fn test_user_create_request(name: &str, order_number: &str, email: &str) -> UserCreateDBRequest {
    UserCreateDBRequest {
        name: name.to_string(),
        order_number: order_number.to_string(),
        email: email.to_string(),
        password_hash: test_hash("password123"),
        message: None,
    }
}

/// Seed a user directly in the database (no HTTP round trip)
pub async fn create_test_user(pool: &PgPool, email: &str, order_number: &str) -> User {
    let mut conn = pool.acquire().await.expect("acquire connection");
    let mut repo = Users::new(&mut conn);
    repo.create(&test_user_create_request("test user", order_number, email))
        .await
        .expect("create test user")
}

/// Issue a token for a user and record the session row, as login would
pub async fn open_session(pool: &PgPool, config: &Config, user_id: UserId, email: &str) -> String {
    let current_user = CurrentUser {
        id: user_id,
        email: email.to_string(),
        is_admin: config.is_admin_email(email),
    };
    let token = session::create_session_token(&current_user, config).expect("create session token");

    let mut conn = pool.acquire().await.expect("acquire connection");
    let mut sessions = Sessions::new(&mut conn);
    sessions
        .create(&SessionCreateDBRequest {
            user_id,
            token: token.clone(),
            expires_at: Utc::now() + config.auth.session.timeout,
        })
        .await
        .expect("record session");

    token
}
