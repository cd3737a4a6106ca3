//! Menu registration: validated here, stored by the venue backend.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::{Extension, Json};
use chrono::Utc;
use tood_core::backend::menu::MenuForm;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::MenuRegisterResponse;
use crate::services::form::read_form;

/// `POST /menu/register`: multipart form with `buffetId`, `title`,
/// `content` and an optional `image`, forwarded to the backend on behalf of
/// the session holder.
pub async fn register_menu_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<MenuRegisterResponse>> {
    let multipart =
        multipart.map_err(|e| AppError::InvalidMenu(format!("expected a multipart form: {e}")))?;
    let mut form = read_form(multipart)
        .await
        .map_err(|e| AppError::InvalidMenu(format!("unreadable form: {e}")))?;

    let menu = MenuForm {
        buffet_id: form.take_field("buffetId"),
        title: form.take_field("title"),
        content: form.take_field("content"),
        image: form.take_file("image"),
    }
    .into_registration(&user.0.subject, Utc::now().date_naive())
    .map_err(AppError::InvalidMenu)?;

    let data = state.backend.register_menu(&menu).await?;

    Ok(Json(MenuRegisterResponse {
        success: true,
        message: "Menu registered".into(),
        data,
    }))
}
