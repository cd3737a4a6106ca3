//! Multipart form reading.

use std::collections::HashMap;

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use tood_core::backend::image::ImageUpload;

/// Text fields and file parts of a multipart form, by field name.
/// Later parts with the same name replace earlier ones.
#[derive(Debug, Default)]
pub struct FormData {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, ImageUpload>,
}

impl FormData {
    /// Take a text field.
    pub fn take_field(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }

    /// Take a file part.
    pub fn take_file(&mut self, name: &str) -> Option<ImageUpload> {
        self.files.remove(name)
    }
}

/// Read every part of `multipart`. Parts carrying a file name are files;
/// the rest are text fields.
pub async fn read_form(mut multipart: Multipart) -> Result<FormData, MultipartError> {
    let mut form = FormData::default();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(String::from) else {
            continue;
        };
        match field.file_name().map(String::from) {
            Some(file_name) => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await?.to_vec();
                form.files.insert(
                    name,
                    ImageUpload {
                        file_name,
                        content_type,
                        bytes,
                    },
                );
            }
            None => {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }
    }
    Ok(form)
}
