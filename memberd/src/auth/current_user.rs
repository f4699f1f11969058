use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    db::handlers::Sessions,
    errors::{Error, Result},
    types::Operation,
};
use axum::{extract::FromRequestParts, http::HeaderMap, http::request::Parts};
use tracing::{debug, instrument, trace};

/// Pull the auth token out of the Cookie header, if present.
pub fn token_from_cookies(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let cookie_header = headers.get(axum::http::header::COOKIE)?;
    let cookie_str = cookie_header.to_str().ok()?;

    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=') {
            if name == cookie_name {
                return Some(value.to_string());
            }
        }
    }
    None
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    /// Resolve the caller's identity from the session cookie.
    ///
    /// The token must pass signature and expiry verification AND still have a
    /// live row in the sessions table - logout deletes the row, so a replayed
    /// pre-logout token is rejected here even though its signature checks out.
    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let cookie_name = &state.config.auth.session.cookie_name;
        let token = match token_from_cookies(&parts.headers, cookie_name) {
            Some(token) => token,
            None => {
                trace!("No session cookie found in request");
                return Err(Error::Unauthenticated { message: None });
            }
        };

        let user = session::verify_session_token(&token, &state.config)?;

        // Server-side revocation check
        let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
        let mut sessions = Sessions::new(&mut conn);
        if sessions.find_active(&token).await?.is_none() {
            trace!("Token verified but session row is revoked or expired");
            return Err(Error::Unauthenticated {
                message: Some("Session has been revoked".to_string()),
            });
        }

        debug!("Authenticated user: {}", user.id);
        Ok(user)
    }
}

/// Extractor gating administrative endpoints.
///
/// Wraps [`CurrentUser`] and rejects identities without the admin capability
/// with 403. Handlers never consult the allow-list directly; the capability
/// is resolved while the token is verified.
#[derive(Debug)]
pub struct AdminUser(pub CurrentUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = CurrentUser::from_request_parts(parts, state).await?;

        if !user.is_admin {
            return Err(Error::InsufficientPermissions {
                action: Operation::ReadAll,
                resource: "administrative resources".to_string(),
            });
        }

        Ok(AdminUser(user))
    }
}
