//! Media payloads handed to the uploader.

use std::path::Path;

use bytes::Bytes;

use super::error::MediaError;
use super::key::file_extension;

/// A file to upload: its original name, MIME type, and bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// Original file name; only its extension reaches generated keys.
    pub name: String,
    /// MIME type sent to the broker and on the PUT.
    pub content_type: String,
    /// Raw contents.
    pub bytes: Bytes,
}

impl std::fmt::Debug for MediaFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl MediaFile {
    /// Create a media file from memory.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, inferring its content type from the extension.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Io` if the file cannot be read.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, MediaError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_string();
        let content_type = content_type_for(&name).to_string();

        Ok(Self::new(name, content_type, bytes))
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// MIME type for the media extensions the app accepts.
#[must_use]
pub fn content_type_for(file_name: &str) -> &'static str {
    match file_extension(file_name).as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "heic" => "image/heic",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}
