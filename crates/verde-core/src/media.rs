//! Image encoding for AI payloads.
//!
//! The identification request carries the user's photo inline as base64
//! data plus a MIME type. The same encoding renders the preview `data:` URI
//! kept in the identification history.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;

use crate::error::Result;

/// Fallback MIME type when the file extension is unknown.
const OCTET_STREAM: &str = "application/octet-stream";

/// A binary image encoded for transport to the AI service.
///
/// Whatever file the user selects is forwarded as-is; no size or type
/// validation is performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Base64-encoded image bytes.
    pub data: String,
    /// MIME type, guessed from the file extension.
    pub mime_type: String,
}

impl EncodedImage {
    /// Encodes raw bytes with an explicit MIME type.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            data: BASE64_STANDARD.encode(bytes),
            mime_type: mime_type.into(),
        }
    }

    /// Reads the whole file asynchronously and encodes it.
    ///
    /// The MIME type is resolved from the file extension, falling back to
    /// `application/octet-stream` when the extension is unknown.
    ///
    /// # Errors
    ///
    /// Propagates the underlying read failure as `VerdeError::Io`.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let mime_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or(OCTET_STREAM);
        Ok(Self::from_bytes(&bytes, mime_type))
    }

    /// Renders the image as a `data:` URI suitable for preview storage.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_encodes_base64() {
        let image = EncodedImage::from_bytes(b"leafy", "image/png");
        assert_eq!(image.data, "bGVhZnk=");
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data_uri(), "data:image/png;base64,bGVhZnk=");
    }

    #[tokio::test]
    async fn test_from_path_guesses_mime_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plant.jpg");
        std::fs::write(&path, b"jpeg bytes").unwrap();

        let image = EncodedImage::from_path(&path).await.unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.data, BASE64_STANDARD.encode(b"jpeg bytes"));
    }

    #[tokio::test]
    async fn test_from_path_falls_back_for_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plant.mystery");
        std::fs::write(&path, b"???").unwrap();

        let image = EncodedImage::from_path(&path).await.unwrap();
        assert_eq!(image.mime_type, OCTET_STREAM);
    }

    #[tokio::test]
    async fn test_from_path_propagates_read_failure() {
        let result = EncodedImage::from_path("/definitely/not/here.png").await;
        assert!(result.is_err());
    }
}
