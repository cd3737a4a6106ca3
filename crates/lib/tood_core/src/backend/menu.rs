//! Menu registration payload.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use serde::Serialize;

use super::image::ImageUpload;

/// Menu fields as submitted by a client, before validation.
#[derive(Debug, Clone, Default)]
pub struct MenuForm {
    pub buffet_id: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub image: Option<ImageUpload>,
}

/// Menu registration forwarded to the venue backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuRegistration {
    pub buffet_id: String,
    pub title: String,
    pub content: String,
    pub user_id: String,
    /// `YYYY-MM-DD`
    pub menu_date: String,
    /// Base64-encoded image bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_content_type: Option<String>,
}

impl MenuForm {
    /// Validate the form and build the registration for `user_id` on
    /// `menu_date`. `buffetId`, `title` and `content` are required; an
    /// attached image must pass the upload checks.
    pub fn into_registration(
        self,
        user_id: &str,
        menu_date: NaiveDate,
    ) -> Result<MenuRegistration, String> {
        let required = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        let (Some(buffet_id), Some(title), Some(content)) = (
            required(self.buffet_id),
            required(self.title),
            required(self.content),
        ) else {
            return Err("buffetId, title and content are required".into());
        };

        let image = self.image.filter(|img| !img.bytes.is_empty());
        if let Some(img) = &image {
            img.validate()?;
        }

        Ok(MenuRegistration {
            buffet_id: buffet_id.trim().to_string(),
            title,
            content,
            user_id: user_id.to_string(),
            menu_date: menu_date.format("%Y-%m-%d").to_string(),
            image_file_name: image.as_ref().map(|i| i.file_name.clone()),
            image_content_type: image.as_ref().map(|i| i.content_type.clone()),
            image: image.map(|i| STANDARD.encode(i.bytes)),
        })
    }
}
