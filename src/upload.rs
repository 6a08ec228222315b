//! Boundary parsing of the inbound multipart form.
//!
//! Turns axum's [`Multipart`] stream into an [`UploadedImage`] before the
//! caption service sees it.

use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError};
use image::ImageFormat;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";
const FALLBACK_FILENAME: &str = "upload";

/// An image received from the browser, alive for one request.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Bytes,
    pub content_type: String,
    pub filename: String,
}

impl UploadedImage {
    pub fn new(
        bytes: impl Into<Bytes>,
        content_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
            filename: filename.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// MIME type to use for the inline preview.
    ///
    /// The declared type is only trusted when it is a plain `image/<subtype>`
    /// token, since it ends up unescaped in a `data:` URI. Otherwise the
    /// format is sniffed from the magic bytes.
    pub fn preview_mime(&self) -> String {
        let declared = self.content_type.split(';').next().unwrap_or("").trim();
        if is_image_mime(declared) {
            return declared.to_ascii_lowercase();
        }
        sniff_mime(&self.bytes)
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string()
    }
}

/// Pull the uploaded file out of the form.
///
/// Takes the first part that carries a filename or is named `file`/`image`;
/// any other fields are drained and ignored. Returns `None` when the form
/// has no such part.
pub async fn read_image(multipart: &mut Multipart) -> Result<Option<UploadedImage>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        let is_file = field.file_name().is_some()
            || matches!(field.name(), Some("file") | Some("image"));
        if !is_file {
            continue;
        }

        let filename = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_FILENAME)
            .to_string();
        let content_type = field
            .content_type()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();
        let bytes = field.bytes().await?;

        tracing::debug!(
            filename = %filename,
            content_type = %content_type,
            size = bytes.len(),
            "Received upload"
        );
        return Ok(Some(UploadedImage {
            bytes,
            content_type,
            filename,
        }));
    }
    Ok(None)
}

fn is_image_mime(mime: &str) -> bool {
    let Some((kind, subtype)) = mime.split_once('/') else {
        return false;
    };
    kind.eq_ignore_ascii_case("image")
        && !subtype.is_empty()
        && subtype
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    let mime = match image::guess_format(bytes).ok()? {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Ico => "image/x-icon",
        ImageFormat::Avif => "image/avif",
        _ => return None,
    };
    Some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[test]
    fn test_preview_uses_declared_image_type() {
        let image = UploadedImage::new(vec![1, 2, 3], "image/PNG", "a.png");
        assert_eq!(image.preview_mime(), "image/png");
    }

    #[test]
    fn test_preview_strips_parameters() {
        let image = UploadedImage::new(vec![1, 2, 3], "image/svg+xml; charset=utf-8", "a.svg");
        assert_eq!(image.preview_mime(), "image/svg+xml");
    }

    #[test]
    fn test_preview_sniffs_when_declared_is_generic() {
        let image = UploadedImage::new(PNG_MAGIC.to_vec(), "application/octet-stream", "a");
        assert_eq!(image.preview_mime(), "image/png");
    }

    #[test]
    fn test_preview_sniffs_when_declared_is_unsafe() {
        let image = UploadedImage::new(PNG_MAGIC.to_vec(), "image/png\"><script>", "a.png");
        assert_eq!(image.preview_mime(), "image/png");
    }

    #[test]
    fn test_preview_falls_back_for_unknown_bytes() {
        let image = UploadedImage::new(b"hello".to_vec(), "text/plain", "a.txt");
        assert_eq!(image.preview_mime(), "application/octet-stream");
    }

    #[test]
    fn test_is_empty() {
        assert!(UploadedImage::new(Vec::new(), "image/png", "a.png").is_empty());
        assert!(!UploadedImage::new(vec![0], "image/png", "a.png").is_empty());
    }
}
