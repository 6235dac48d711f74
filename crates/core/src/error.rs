use thiserror::Error;

use crate::constants::{MAX_SCORE, MAX_UPLOAD_BYTES};

/// Caller input rejected before any work is attempted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("file too large: {size} bytes, maximum size is 10 MB ({limit} bytes)")]
    TooLarge { size: usize, limit: usize },

    #[error("unsupported file format '{0}', allowed: pdf, png, jpg, jpeg, gif, webp")]
    UnsupportedType(String),

    #[error("invalid url '{0}': only http and https are accepted")]
    InvalidUrl(String),

    #[error("score {0} out of range 0..={MAX_SCORE}")]
    ScoreOutOfRange(i64),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ValidationError {
    #[must_use]
    pub const fn too_large(size: usize) -> Self {
        Self::TooLarge { size, limit: MAX_UPLOAD_BYTES }
    }
}

/// Why a well-formed upload yielded no usable text.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnprocessableReason {
    #[error("document is password-protected or encrypted")]
    Encrypted,

    #[error("document appears to be a scanned image without OCR text")]
    ScannedWithoutOcr,

    #[error("image could not be read")]
    UnreadableImage,

    #[error("file is corrupt or in an unsupported layout")]
    CorruptOrUnsupported,

    #[error("no text content could be extracted")]
    NoTextContent,
}

impl UnprocessableReason {
    /// Machine-readable code returned to clients.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Encrypted => "encrypted",
            Self::ScannedWithoutOcr => "scanned_without_ocr",
            Self::UnreadableImage => "unreadable_image",
            Self::CorruptOrUnsupported => "corrupt_or_unsupported",
            Self::NoTextContent => "no_text_content",
        }
    }

    /// Actionable hint shown alongside the error.
    #[must_use]
    pub const fn guidance(self) -> &'static str {
        match self {
            Self::Encrypted => "Remove the password protection and upload the file again.",
            Self::ScannedWithoutOcr => {
                "Run the scan through OCR software, or upload the pages as images."
            },
            Self::UnreadableImage => "Upload a clearer PNG, JPEG, GIF or WEBP image.",
            Self::CorruptOrUnsupported => "Re-export the document as a standard PDF and retry.",
            Self::NoTextContent => "Make sure the document contains selectable text.",
        }
    }
}
