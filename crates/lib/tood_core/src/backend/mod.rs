//! Client for the upstream venue/menu backend.
//!
//! The backend is an opaque HTTP service. Its replies carry a `success`
//! marker that may arrive as a boolean or as the strings `"true"`/`"false"`;
//! it is normalized to `bool` on receipt.

pub mod image;
pub mod menu;
pub mod sitemap;

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use self::image::ImageUpload;
use self::menu::MenuRegistration;

/// Default timeout for backend calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Backend errors.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend could not be reached, timed out, or sent an unreadable reply.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// The backend answered but reported failure, with its message if any.
    #[error("Backend rejected request: {}", .0.as_deref().unwrap_or("no message"))]
    Rejected(Option<String>),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Reply envelope shared by backend endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendReply {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Accept `true`, `"true"` (any case), `1` and `"1"` as true; anything
/// else is false.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::String(s) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s == "1"
        }
        Value::Number(n) => n.as_i64() == Some(1),
        _ => false,
    })
}

/// Accept an integer id sent as a number or a numeric string.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// One venue as listed by the backend's `/buffets` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuffetSummary {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub has_today_menu: bool,
    #[serde(default, deserialize_with = "lenient_id")]
    pub today_menu_id: Option<i64>,
}

/// HTTP client for the venue/menu backend.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for `base_url` whose calls time out after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Internal(format!("http client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Forward a menu registration. Returns the backend's `data` payload.
    pub async fn register_menu(
        &self,
        menu: &MenuRegistration,
    ) -> Result<Option<Value>, BackendError> {
        let url = format!("{}/menu/register", self.base_url);
        let resp = self.http.post(&url).json(menu).send().await;
        let reply = read_reply(&url, resp).await?;
        info!(buffet_id = %menu.buffet_id, user_id = %menu.user_id, "menu registered upstream");
        Ok(reply.data)
    }

    /// List the backend's venues.
    pub async fn list_buffets(&self) -> Result<Vec<BuffetSummary>, BackendError> {
        let url = format!("{}/buffets", self.base_url);
        let resp = self.http.get(&url).send().await;
        let reply = read_reply(&url, resp).await?;
        match reply.data {
            Some(data @ Value::Array(_)) => serde_json::from_value(data).map_err(|e| {
                warn!(url, error = %e, "unexpected buffet list shape");
                BackendError::Unavailable(format!("buffet list: {e}"))
            }),
            _ => Ok(Vec::new()),
        }
    }

    /// Forward an image upload. Returns the stored image's URL.
    pub async fn upload_image(&self, image: ImageUpload) -> Result<String, BackendError> {
        let url = format!("{}/upload/image", self.base_url);
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)
            .map_err(|e| BackendError::Internal(format!("image part: {e}")))?;
        let form = Form::new().part("image", part);

        let resp = self.http.post(&url).multipart(form).send().await;
        let reply = read_reply(&url, resp).await?;
        reply
            .image_url
            .ok_or_else(|| BackendError::Unavailable("upload reply missing imageUrl".into()))
    }
}

/// Decode a backend reply, mapping transport failures and `success: false`.
///
/// Non-2xx replies with a JSON body are still decoded so the backend's own
/// message can be passed through.
async fn read_reply(
    url: &str,
    resp: Result<reqwest::Response, reqwest::Error>,
) -> Result<BackendReply, BackendError> {
    let resp = resp.map_err(|e| {
        warn!(url, error = %e, "backend request failed");
        BackendError::Unavailable(e.to_string())
    })?;
    let status = resp.status();
    let body = resp.bytes().await.map_err(|e| {
        warn!(url, error = %e, "backend reply unreadable");
        BackendError::Unavailable(e.to_string())
    })?;
    let reply = parse_reply(&body).map_err(|e| {
        warn!(url, %status, error = %e, "backend reply is not JSON");
        BackendError::Unavailable(format!("status {status}: {e}"))
    })?;

    if !reply.success {
        warn!(url, %status, message = ?reply.message, "backend reported failure");
        return Err(BackendError::Rejected(reply.message));
    }
    Ok(reply)
}

/// Parse a backend reply body.
pub fn parse_reply(body: &[u8]) -> Result<BackendReply, serde_json::Error> {
    serde_json::from_slice(body)
}
