use crate::constants::MAX_UPLOAD_BYTES;
use crate::error::ValidationError;

/// Raster image formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }

    /// Whether `bytes` start with this format's signature.
    #[must_use]
    pub fn matches_signature(self, bytes: &[u8]) -> bool {
        match self {
            Self::Png => bytes.starts_with(b"\x89PNG\r\n\x1a\n"),
            Self::Jpeg => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
            Self::Gif => bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a"),
            Self::Webp => {
                bytes.len() >= 12
                    && bytes.get(..4) == Some(b"RIFF".as_slice())
                    && bytes.get(8..12) == Some(b"WEBP".as_slice())
            },
        }
    }
}

/// Kind of content an upload holds, decided before extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Image(ImageFormat),
}

impl FileKind {
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "png" => Some(Self::Image(ImageFormat::Png)),
            "jpg" | "jpeg" => Some(Self::Image(ImageFormat::Jpeg)),
            "gif" => Some(Self::Image(ImageFormat::Gif)),
            "webp" => Some(Self::Image(ImageFormat::Webp)),
            _ => None,
        }
    }

    /// Parse a MIME type, ignoring parameters such as `; charset=`.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        match mime.as_str() {
            "application/pdf" => Some(Self::Pdf),
            "image/png" => Some(Self::Image(ImageFormat::Png)),
            "image/jpeg" | "image/jpg" => Some(Self::Image(ImageFormat::Jpeg)),
            "image/gif" => Some(Self::Image(ImageFormat::Gif)),
            "image/webp" => Some(Self::Image(ImageFormat::Webp)),
            _ => None,
        }
    }
}

fn extension(file_name: &str) -> Option<&str> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    (!stem.is_empty() && !ext.is_empty()).then_some(ext)
}

/// Check emptiness, size and type of an upload. No content is inspected.
///
/// The extension decides the kind; the declared content type is consulted only
/// when the name carries no extension.
pub fn validate_upload(
    file_name: &str,
    content_type: Option<&str>,
    len: usize,
) -> Result<FileKind, ValidationError> {
    if len == 0 {
        return Err(ValidationError::Empty { field: "file" });
    }
    if len > MAX_UPLOAD_BYTES {
        return Err(ValidationError::too_large(len));
    }
    match extension(file_name) {
        Some(ext) => FileKind::from_extension(ext)
            .ok_or_else(|| ValidationError::UnsupportedType(ext.to_ascii_lowercase())),
        None => content_type
            .and_then(FileKind::from_content_type)
            .ok_or_else(|| ValidationError::UnsupportedType(content_type.unwrap_or("unknown").to_owned())),
    }
}

/// Check that `url` is an absolute http(s) URL with a host.
pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field: "url" });
    }
    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .ok_or_else(|| ValidationError::InvalidUrl(trimmed.to_owned()))?;
    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidUrl(trimmed.to_owned()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ALLOWED_EXTENSIONS;

    #[test]
    fn oversize_rejected_before_type_check() {
        let err = validate_upload("movie.mp4", None, MAX_UPLOAD_BYTES + 1).unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { .. }));
    }

    #[test]
    fn exactly_at_limit_is_accepted() {
        assert_eq!(validate_upload("notes.PDF", None, MAX_UPLOAD_BYTES), Ok(FileKind::Pdf));
    }

    #[test]
    fn unsupported_extension_rejected() {
        let err = validate_upload("essay.docx", Some("application/pdf"), 10).unwrap_err();
        assert_eq!(err, ValidationError::UnsupportedType("docx".to_owned()));
    }

    #[test]
    fn content_type_used_without_extension() {
        assert_eq!(
            validate_upload("scan", Some("image/png; charset=binary"), 10),
            Ok(FileKind::Image(ImageFormat::Png))
        );
        assert!(validate_upload("scan", None, 10).is_err());
    }

    #[test]
    fn empty_file_rejected() {
        assert_eq!(validate_upload("a.pdf", None, 0), Err(ValidationError::Empty { field: "file" }));
    }

    #[test]
    fn url_validation() {
        assert!(validate_url("https://example.com/syllabus").is_ok());
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("https://").is_err());
        assert!(validate_url("   ").is_err());
    }

    #[test]
    fn image_signatures() {
        assert!(ImageFormat::Png.matches_signature(b"\x89PNG\r\n\x1a\nrest"));
        assert!(ImageFormat::Gif.matches_signature(b"GIF89a...."));
        assert!(ImageFormat::Webp.matches_signature(b"RIFF\0\0\0\0WEBPVP8 "));
        assert!(!ImageFormat::Jpeg.matches_signature(b"not a jpeg"));
    }

    #[test]
    fn every_allowed_extension_maps_to_a_kind() {
        for ext in ALLOWED_EXTENSIONS {
            assert!(FileKind::from_extension(ext).is_some(), "{ext}");
            assert!(FileKind::from_extension(&ext.to_ascii_uppercase()).is_some());
        }
    }
}
