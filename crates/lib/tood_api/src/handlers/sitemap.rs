//! Sitemap of the public site.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use tood_core::backend::sitemap::render_sitemap;
use tracing::warn;

use crate::AppState;

/// `GET /sitemap.xml`: the home page plus every venue with a menu today.
///
/// When the backend cannot list venues the home page is still served.
pub async fn sitemap_handler(State(state): State<AppState>) -> impl IntoResponse {
    let buffets = state.backend.list_buffets().await.unwrap_or_else(|e| {
        warn!(error = %e, "sitemap without venue entries");
        Vec::new()
    });
    (
        [(header::CONTENT_TYPE, "application/xml")],
        render_sitemap(&state.config.site_url, &buffets),
    )
}
