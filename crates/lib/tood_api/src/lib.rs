//! # tood_api
//!
//! HTTP API library for Tood.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tood_core::auth::credential::{CredentialVerifier, KeySource, RemoteKeySource};
use tood_core::auth::gate::RequestGate;
use tood_core::auth::session::SessionManager;
use tood_core::backend::{BackendClient, BackendError};
use tood_core::reviews::ReviewStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{auth, health, menu, reviews, sitemap, upload};

/// Request body limit for form uploads: the 10 MiB image plus form overhead.
pub const UPLOAD_BODY_LIMIT: usize = 15 * 1024 * 1024;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: ApiConfig,
    /// Session issuance, resolution and revocation.
    pub sessions: Arc<SessionManager>,
    /// Authorization check for guarded routes.
    pub gate: RequestGate,
    /// Login credential verification.
    pub credentials: Arc<CredentialVerifier>,
    /// Review persistence.
    pub reviews: Arc<dyn ReviewStore>,
    /// Venue/menu backend.
    pub backend: BackendClient,
}

impl AppState {
    /// Assemble state from configuration, a credential key source and a
    /// review store.
    pub fn new(
        config: ApiConfig,
        keys: Arc<dyn KeySource>,
        reviews: Arc<dyn ReviewStore>,
    ) -> Result<Self, BackendError> {
        let sessions = Arc::new(SessionManager::new(config.session_secret.as_bytes()));
        let credentials = Arc::new(CredentialVerifier::new(
            keys,
            config.credential_issuers.clone(),
        ));
        let backend = BackendClient::new(config.backend_url.clone(), config.upstream_timeout)?;
        Ok(Self {
            gate: RequestGate::new(Arc::clone(&sessions)),
            sessions,
            credentials,
            reviews,
            backend,
            config,
        })
    }
}

/// Key source fetching the configured JWK set over HTTP.
pub fn remote_key_source(config: &ApiConfig) -> Result<RemoteKeySource, reqwest::Error> {
    let http = reqwest::Client::builder()
        .timeout(config.upstream_timeout)
        .build()?;
    Ok(RemoteKeySource::new(http, config.jwks_url.clone()))
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::GET_HEALTH, get(health::health))
        .route(routes::GET_SITEMAP, get(sitemap::sitemap_handler))
        .route(routes::POST_LOGIN, post(auth::login_handler))
        .route(routes::POST_LOGOUT, post(auth::logout_handler))
        .route(routes::GET_REVIEWS_STATS, get(reviews::review_stats_handler))
        .route(routes::REVIEWS_VENUE_ID, get(reviews::list_reviews_handler));

    // Protected routes (require a session)
    let protected = Router::new()
        .route(routes::GET_ME, get(auth::me_handler))
        .route(
            routes::REVIEWS_VENUE_ID,
            post(reviews::create_review_handler),
        )
        .route(
            routes::POST_MENU_REGISTER,
            post(menu::register_menu_handler).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            routes::POST_UPLOAD_IMAGE,
            post(upload::upload_image_handler).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_session,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
