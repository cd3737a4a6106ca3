//! Uploaded image validation.

/// MIME types accepted for uploaded images.
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Maximum accepted image size: 10 MiB.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// An image received from a client, ready to forward upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Check the declared type and the size against the upload limits.
    pub fn validate(&self) -> Result<(), String> {
        if self.bytes.is_empty() {
            return Err("image file is empty".into());
        }
        if !ALLOWED_IMAGE_TYPES.contains(&self.content_type.as_str()) {
            return Err(format!(
                "unsupported image type '{}'; allowed: JPG, PNG, GIF, WEBP",
                self.content_type
            ));
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err("image exceeds the 10MB limit".into());
        }
        Ok(())
    }
}
