//! Authentication middleware: session cookie extraction and the request gate.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tood_core::models::auth::IdentityClaims;

use crate::AppState;
use crate::error::AppError;
use crate::services::cookies::SESSION_COOKIE;

/// Identity of the session holder, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub IdentityClaims);

/// Axum middleware: reads the `session_user` cookie, authorizes it through
/// the request gate, and injects `AuthenticatedUser` into request extensions.
///
/// Runs before any body extraction, so an unauthenticated request never
/// reaches a handler or the store.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let jar = CookieJar::from_headers(request.headers());
    let token = jar.get(SESSION_COOKIE).map(|c| c.value());

    let claims = state.gate.authorize(token)?;

    request.extensions_mut().insert(AuthenticatedUser(claims));

    Ok(next.run(request).await)
}
