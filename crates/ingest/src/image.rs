use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use edumate_core::{FileKind, ImageFormat, UnprocessableReason};

const SNIFF_ORDER: [ImageFormat; 4] = [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Gif, ImageFormat::Webp];

/// Encode image bytes as a `data:` URL after checking the declared format's signature.
pub fn image_data_url(format: ImageFormat, bytes: &[u8]) -> Result<String, UnprocessableReason> {
    if !format.matches_signature(bytes) {
        return Err(UnprocessableReason::UnreadableImage);
    }
    Ok(format!("data:{};base64,{}", format.mime(), STANDARD.encode(bytes)))
}

/// Guess the kind of an untyped body from its leading bytes.
#[must_use]
pub fn sniff_kind(bytes: &[u8]) -> Option<FileKind> {
    if bytes.starts_with(b"%PDF-") {
        return Some(FileKind::Pdf);
    }
    SNIFF_ORDER.into_iter().find(|f| f.matches_signature(bytes)).map(FileKind::Image)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn png_becomes_data_url() {
        let url = image_data_url(ImageFormat::Png, PNG_HEADER).unwrap_or_default();
        assert!(url.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn mismatched_signature_is_unreadable() {
        assert_eq!(
            image_data_url(ImageFormat::Jpeg, PNG_HEADER),
            Err(UnprocessableReason::UnreadableImage)
        );
    }

    #[test]
    fn sniffing() {
        assert_eq!(sniff_kind(b"%PDF-1.7 ..."), Some(FileKind::Pdf));
        assert_eq!(sniff_kind(PNG_HEADER), Some(FileKind::Image(ImageFormat::Png)));
        assert_eq!(sniff_kind(b"<html>"), None);
    }
}
