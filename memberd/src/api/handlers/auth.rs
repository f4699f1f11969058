use axum::{Json, extract::State, http::HeaderMap};
use chrono::Utc;

use crate::{
    AppState,
    api::models::{
        auth::{AuthResponse, AuthSuccessResponse, LoginRequest, LoginResponse, LogoutResponse, RegisterRequest, RegisterResponse},
        users::{CurrentUser, UserResponse},
    },
    auth::{current_user::token_from_cookies, password, session},
    db::{
        handlers::{Repository, Sessions, Users},
        models::{sessions::SessionCreateDBRequest, users::UserCreateDBRequest},
    },
    errors::Error,
};

/// Register a new user account
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    tag = "auth",
    responses(
        (status = 200, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Missing fields or duplicate email/order number"),
        (status = 409, description = "Registration race lost to a concurrent request"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(State(state): State<AppState>, Json(request): Json<RegisterRequest>) -> Result<RegisterResponse, Error> {
    // Required-field validation happens here (not at deserialization) so the
    // client gets a 400 with a usable message
    let (name, order_number, email, password_plain) = match (
        request.name.filter(|s| !s.is_empty()),
        request.order_number.filter(|s| !s.is_empty()),
        request.email.filter(|s| !s.is_empty()),
        request.password.filter(|s| !s.is_empty()),
    ) {
        (Some(n), Some(o), Some(e), Some(p)) => (n, o, e, p),
        _ => {
            return Err(Error::BadRequest {
                message: "Name, order number, email and password are required".to_string(),
            });
        }
    };

    // Validate password length
    let password_config = &state.config.auth.password;
    if password_plain.len() < password_config.min_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at least {} characters", password_config.min_length),
        });
    }
    if password_plain.len() > password_config.max_length {
        return Err(Error::BadRequest {
            message: format!("Password must be no more than {} characters", password_config.max_length),
        });
    }

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    // Duplicate pre-checks are a fast path for a friendlier message; the
    // unique constraints remain the source of truth under concurrency
    let mut user_repo = Users::new(&mut tx);
    if user_repo.get_by_email(&email).await?.is_some() {
        return Err(Error::BadRequest {
            message: "An account with this email address already exists".to_string(),
        });
    }
    if user_repo.get_by_order_number(&order_number).await?.is_some() {
        return Err(Error::BadRequest {
            message: "An account with this order number already exists".to_string(),
        });
    }

    // Hash the password on a blocking thread to avoid blocking async runtime
    let password_hash = tokio::task::spawn_blocking(move || password::hash_string(&password_plain))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let created_user = user_repo
        .create(&UserCreateDBRequest {
            name,
            order_number,
            email,
            password_hash,
            message: request.message,
        })
        .await?;

    // Issue the token and record the session so logout can revoke it
    let current_user = CurrentUser {
        id: created_user.id,
        email: created_user.email.clone(),
        is_admin: state.config.is_admin_email(&created_user.email),
    };
    let token = session::create_session_token(&current_user, &state.config)?;

    let mut session_repo = Sessions::new(&mut tx);
    session_repo
        .create(&SessionCreateDBRequest {
            user_id: created_user.id,
            token: token.clone(),
            expires_at: Utc::now() + state.config.auth.session.timeout,
        })
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    let cookie = create_session_cookie(&token, &state.config);
    let auth_response = AuthResponse {
        user: UserResponse::from(created_user),
        token,
        message: "Registration successful".to_string(),
    };

    Ok(RegisterResponse { auth_response, cookie })
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    tag = "auth",
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<LoginResponse, Error> {
    let (email, password_plain) = match (
        request.email.filter(|s| !s.is_empty()),
        request.password.filter(|s| !s.is_empty()),
    ) {
        (Some(e), Some(p)) => (e, p),
        _ => {
            return Err(Error::BadRequest {
                message: "Email and password are required".to_string(),
            });
        }
    };

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let mut user_repo = Users::new(&mut tx);
    let user = user_repo.get_by_email(&email).await?.ok_or_else(|| Error::Unauthenticated {
        message: Some("Invalid email or password".to_string()),
    })?;

    // Verify password on a blocking thread to avoid blocking async runtime
    let hash = user.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_string(&password_plain, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(Error::Unauthenticated {
            message: Some("Invalid email or password".to_string()),
        });
    }

    let current_user = CurrentUser {
        id: user.id,
        email: user.email.clone(),
        is_admin: state.config.is_admin_email(&user.email),
    };
    let token = session::create_session_token(&current_user, &state.config)?;

    let mut session_repo = Sessions::new(&mut tx);
    // Opportunistic cleanup; dead rows only waste space
    session_repo.purge_expired(user.id).await?;
    session_repo
        .create(&SessionCreateDBRequest {
            user_id: user.id,
            token: token.clone(),
            expires_at: Utc::now() + state.config.auth.session.timeout,
        })
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    let cookie = create_session_cookie(&token, &state.config);
    let auth_response = AuthResponse {
        user: UserResponse::from(user),
        token,
        message: "Login successful".to_string(),
    };

    Ok(LoginResponse { auth_response, cookie })
}

/// Logout (revoke session, clear cookie)
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logout successful", body = AuthSuccessResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<LogoutResponse, Error> {
    // Best-effort: succeeds whether or not a session existed. The token is
    // read straight from the cookie because an expired token should still be
    // able to log out.
    if let Some(token) = token_from_cookies(&headers, &state.config.auth.session.cookie_name) {
        let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
        let mut session_repo = Sessions::new(&mut conn);
        session_repo.delete_by_token(&token).await?;
    }

    let cookie = create_clear_cookie(&state.config);
    let auth_response = AuthSuccessResponse {
        message: "Logout successful".to_string(),
    };

    Ok(LogoutResponse { auth_response, cookie })
}

/// Helper function to create a session cookie
fn create_session_cookie(token: &str, config: &crate::config::Config) -> String {
    let session_config = &config.auth.session;
    let max_age = session_config.timeout.as_secs();

    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite={}; Max-Age={}",
        session_config.cookie_name, token, session_config.cookie_same_site, max_age
    );
    if session_config.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Expired cookie that clears the session on the client
fn create_clear_cookie(config: &crate::config::Config) -> String {
    let session_config = &config.auth.session;

    let mut cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite={}; Max-Age=0",
        session_config.cookie_name, session_config.cookie_same_site
    );
    if session_config.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_config, create_test_server, register_user};
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;

    #[test]
    fn test_session_cookie_attributes() {
        let config = create_test_config();
        let cookie = create_session_cookie("tok", &config);

        assert!(cookie.starts_with("auth_token=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=86400"));

        let cleared = create_clear_cookie(&config);
        assert!(cleared.contains("Max-Age=0"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_success(pool: PgPool) {
        let server = create_test_server(pool).await;

        let response = server
            .post("/auth/register")
            .json(&json!({
                "name": "A",
                "order_number": "O1",
                "email": "a@x.com",
                "password": "password123"
            }))
            .await;

        response.assert_status(StatusCode::OK);
        assert!(response.headers().get("set-cookie").is_some());

        let body: AuthResponse = response.json();
        assert_eq!(body.user.email, "a@x.com");
        assert_eq!(body.user.order_number, "O1");
        assert!(!body.token.is_empty());

        // The hash never appears in a response body
        let raw = response.text();
        assert!(!raw.contains("password_hash"));
        assert!(!raw.contains("argon2"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_missing_fields(pool: PgPool) {
        let server = create_test_server(pool).await;

        let response = server
            .post("/auth/register")
            .json(&json!({"name": "A", "email": "a@x.com"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_short_password(pool: PgPool) {
        let server = create_test_server(pool).await;

        let response = server
            .post("/auth/register")
            .json(&json!({
                "name": "A",
                "order_number": "O1",
                "email": "a@x.com",
                "password": "short"
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_duplicate_email(pool: PgPool) {
        let server = create_test_server(pool).await;
        register_user(&server, "A", "O1", "dup@x.com").await;

        let response = server
            .post("/auth/register")
            .json(&json!({
                "name": "B",
                "order_number": "O2",
                "email": "dup@x.com",
                "password": "password123"
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("email address already exists"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_duplicate_order_number(pool: PgPool) {
        let server = create_test_server(pool).await;
        register_user(&server, "A", "O1", "a@x.com").await;

        let response = server
            .post("/auth/register")
            .json(&json!({
                "name": "B",
                "order_number": "O1",
                "email": "b@x.com",
                "password": "password123"
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("order number already exists"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_roundtrip(pool: PgPool) {
        let server = create_test_server(pool).await;
        register_user(&server, "A", "O1", "a@x.com").await;

        let response = server
            .post("/auth/login")
            .json(&json!({"email": "a@x.com", "password": "password123"}))
            .await;

        response.assert_status(StatusCode::OK);
        assert!(response.headers().get("set-cookie").is_some());
        let body: AuthResponse = response.json();
        assert_eq!(body.user.email, "a@x.com");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_wrong_password(pool: PgPool) {
        let server = create_test_server(pool).await;
        register_user(&server, "A", "O1", "a@x.com").await;

        let response = server
            .post("/auth/login")
            .json(&json!({"email": "a@x.com", "password": "wrong-password"}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_unknown_user(pool: PgPool) {
        let server = create_test_server(pool).await;

        let response = server
            .post("/auth/login")
            .json(&json!({"email": "ghost@x.com", "password": "password123"}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_missing_fields(pool: PgPool) {
        let server = create_test_server(pool).await;

        let response = server.post("/auth/login").json(&json!({"email": "a@x.com"})).await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_logout_revokes_session(pool: PgPool) {
        let server = create_test_server(pool).await;
        register_user(&server, "A", "O1", "a@x.com").await;

        // Cookie is carried by the test server; /users/me works before logout
        server.get("/users/me").await.assert_status(StatusCode::OK);

        server.post("/auth/logout").await.assert_status(StatusCode::OK);

        // The token's signature is still valid, but the session row is gone
        server.get("/users/me").await.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_logout_without_session_succeeds(pool: PgPool) {
        let server = create_test_server(pool).await;

        server.post("/auth/logout").await.assert_status(StatusCode::OK);
    }
}
