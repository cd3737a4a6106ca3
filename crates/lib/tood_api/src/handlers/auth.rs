//! Login, logout and current-session handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use axum_extra::extract::cookie::CookieJar;
use tood_core::models::auth::IdentityClaims;
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{LoginRequest, LogoutResponse};
use crate::services::cookies::{SESSION_COOKIE, clear_session_cookie, session_cookie};

/// `POST /login`: verify a third-party credential and start a session.
///
/// On success the session cookie is set and the identity claims returned.
/// A rejected credential sets no cookie.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<(CookieJar, Json<IdentityClaims>)> {
    let Json(body) =
        body.map_err(|e| AppError::InvalidCredential(format!("malformed login body: {e}")))?;

    let claims = state
        .credentials
        .verify(&body.credential, &state.config.google_client_id)
        .await?;

    let token = state.sessions.issue(&claims)?;
    let cookie = session_cookie(
        token.as_str(),
        state.sessions.ttl().num_seconds(),
        state.config.cookie_secure,
    );

    info!(sub = %claims.subject, "user logged in");
    Ok((jar.add(cookie), Json(claims)))
}

/// `POST /logout`: revoke the current session, if any, and clear its cookie.
pub async fn logout_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<LogoutResponse>) {
    let token = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    state.sessions.revoke(token.as_deref());
    let jar = jar.add(clear_session_cookie(state.config.cookie_secure));
    (jar, Json(LogoutResponse { success: true }))
}

/// `GET /me`: the current session's identity claims.
pub async fn me_handler(
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<IdentityClaims> {
    Json(user.0)
}
