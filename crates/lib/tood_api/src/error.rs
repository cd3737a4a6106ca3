//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Message returned when the backend fails without a usable message.
const UPSTREAM_FAILURE_MESSAGE: &str = "The upstream service could not complete the request";

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Invalid review: {0}")]
    InvalidReview(String),

    #[error("Invalid menu: {0}")]
    InvalidMenu(String),

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// Backend failure; carries the backend's own message when it sent one.
    #[error("Upstream unavailable: {}", .0.as_deref().unwrap_or(UPSTREAM_FAILURE_MESSAGE))]
    UpstreamUnavailable(Option<String>),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::InvalidCredential(_) => (
                StatusCode::UNAUTHORIZED,
                "invalid_credential",
                "Invalid credential",
            ),
            AppError::Unauthenticated(m) => {
                (StatusCode::UNAUTHORIZED, "unauthenticated", m.as_str())
            }
            AppError::InvalidReview(m) => (StatusCode::BAD_REQUEST, "invalid_review", m.as_str()),
            AppError::InvalidMenu(m) => (StatusCode::BAD_REQUEST, "invalid_menu", m.as_str()),
            AppError::InvalidUpload(m) => (StatusCode::BAD_REQUEST, "invalid_upload", m.as_str()),
            AppError::UpstreamUnavailable(m) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "upstream_unavailable",
                m.as_deref().unwrap_or(UPSTREAM_FAILURE_MESSAGE),
            ),
            AppError::Internal(detail) => {
                error!(detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                )
            }
        };
        let body = Json(ErrorResponse {
            success: false,
            error: error.to_string(),
            message: message.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<tood_core::auth::AuthError> for AppError {
    fn from(e: tood_core::auth::AuthError) -> Self {
        match e {
            tood_core::auth::AuthError::InvalidCredential(msg) => AppError::InvalidCredential(msg),
            tood_core::auth::AuthError::Unauthenticated => {
                AppError::Unauthenticated("Login required".into())
            }
            tood_core::auth::AuthError::KeySet(msg) => {
                error!(detail = %msg, "credential key set unavailable");
                AppError::UpstreamUnavailable(None)
            }
            tood_core::auth::AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<tood_core::reviews::ReviewError> for AppError {
    fn from(e: tood_core::reviews::ReviewError) -> Self {
        match e {
            tood_core::reviews::ReviewError::InvalidReview(msg) => AppError::InvalidReview(msg),
            tood_core::reviews::ReviewError::DbError(e) => AppError::Internal(e.to_string()),
            tood_core::reviews::ReviewError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<tood_core::backend::BackendError> for AppError {
    fn from(e: tood_core::backend::BackendError) -> Self {
        match e {
            // Transport details stay in the logs.
            tood_core::backend::BackendError::Unavailable(_) => AppError::UpstreamUnavailable(None),
            tood_core::backend::BackendError::Rejected(msg) => AppError::UpstreamUnavailable(msg),
            tood_core::backend::BackendError::Internal(msg) => AppError::Internal(msg),
        }
    }
}
