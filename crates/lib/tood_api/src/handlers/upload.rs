//! Image upload: validated here, stored by the venue backend.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::{Extension, Json};
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::ImageUploadResponse;
use crate::services::form::read_form;

/// `POST /upload/image`: multipart form with one `image` file part.
pub async fn upload_image_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<ImageUploadResponse>> {
    let multipart = multipart
        .map_err(|e| AppError::InvalidUpload(format!("expected a multipart form: {e}")))?;
    let mut form = read_form(multipart)
        .await
        .map_err(|e| AppError::InvalidUpload(format!("unreadable form: {e}")))?;

    let image = form
        .take_file("image")
        .ok_or_else(|| AppError::InvalidUpload("no image file selected".into()))?;
    image.validate().map_err(AppError::InvalidUpload)?;

    let size = image.bytes.len();
    let image_url = state.backend.upload_image(image).await?;

    info!(sub = %user.0.subject, size, image_url = %image_url, "image uploaded");
    Ok(Json(ImageUploadResponse {
        success: true,
        image_url,
        message: "Image uploaded".into(),
    }))
}
