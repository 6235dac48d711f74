//! PDF text extraction using lopdf.

use edumate_core::UnprocessableReason;
use lopdf::{Document, Object};
use tracing::{debug, warn};

/// Extract the text of every page.
///
/// When no text comes out, the reason is classified: encrypted documents,
/// image-only scans, unparsable files, and documents that are simply empty.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, UnprocessableReason> {
    let doc = match Document::load_mem(bytes) {
        Ok(doc) => doc,
        Err(e) => {
            warn!(error = %e, "Failed to load PDF");
            return Err(if has_encrypt_marker(bytes) {
                UnprocessableReason::Encrypted
            } else {
                UnprocessableReason::CorruptOrUnsupported
            });
        },
    };
    let encrypted = doc.trailer.get(b"Encrypt").is_ok();

    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    debug!(page_count = page_numbers.len(), encrypted, "Extracting text from PDF");

    let raw = match doc.extract_text(&page_numbers) {
        Ok(text) => text,
        Err(e) if encrypted => {
            warn!(error = %e, "Text extraction failed on encrypted PDF");
            return Err(UnprocessableReason::Encrypted);
        },
        Err(e) if page_numbers.is_empty() => {
            debug!(error = %e, "PDF has no pages");
            String::new()
        },
        Err(e) => {
            warn!(error = %e, "Text extraction failed");
            return Err(UnprocessableReason::CorruptOrUnsupported);
        },
    };

    let cleaned = clean_text(&raw);
    if !cleaned.is_empty() {
        return Ok(cleaned);
    }
    if encrypted {
        Err(UnprocessableReason::Encrypted)
    } else if has_images(&doc) {
        Err(UnprocessableReason::ScannedWithoutOcr)
    } else {
        Err(UnprocessableReason::NoTextContent)
    }
}

fn has_encrypt_marker(bytes: &[u8]) -> bool {
    bytes.windows(b"/Encrypt".len()).any(|w| w == b"/Encrypt")
}

fn has_images(doc: &Document) -> bool {
    doc.objects.values().any(|object| match object {
        Object::Stream(stream) => {
            matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(name)) if name.as_slice() == b"Image")
        },
        _ => false,
    })
}

/// Collapse runs of spaces inside lines and drop blank lines.
fn clean_text(text: &str) -> String {
    text.replace('\u{FEFF}', "")
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
