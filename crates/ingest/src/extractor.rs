use std::sync::Arc;

use edumate_core::text::{html_title, html_to_text};
use edumate_core::{
    FileKind, ImageFormat, NewDocument, Source, UnprocessableReason, validate_upload, validate_url,
};
use edumate_llm::Assistant;
use tracing::{debug, info};

use crate::chunker::chunk_text;
use crate::error::IngestError;
use crate::image::{image_data_url, sniff_kind};
use crate::pdf::extract_pdf_text;
use crate::web::{FetchedPage, PageFetcher};

/// Text pulled out of one upload or URL, ready to be attached to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub source: Source,
    pub text: String,
    pub chunks: Vec<String>,
}

impl Extracted {
    fn new(source: Source, text: String) -> Self {
        let chunks = chunk_text(&text);
        Self { source: source.with_excerpt_from(&text), text, chunks }
    }

    #[must_use]
    pub fn into_document(self) -> NewDocument {
        NewDocument { source: self.source, chunks: self.chunks }
    }
}

/// Turns uploads and URLs into text. Images are described by the vision model.
#[derive(Clone)]
pub struct Extractor {
    assistant: Assistant,
    fetcher: Arc<dyn PageFetcher>,
}

impl Extractor {
    #[must_use]
    pub fn new(assistant: Assistant, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { assistant, fetcher }
    }

    /// Validate and extract an uploaded file.
    pub async fn extract_file(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<Extracted, IngestError> {
        let kind = validate_upload(file_name, content_type, bytes.len())?;
        let text = self.file_text(kind, bytes).await?;
        let source = match kind {
            FileKind::Pdf => Source::document(file_name),
            FileKind::Image(_) => Source::image(file_name),
        };
        info!(file_name, chars = text.len(), "Extracted uploaded file");
        Ok(Extracted::new(source, text))
    }

    /// Extract text from bytes whose kind is already known.
    pub async fn file_text(&self, kind: FileKind, bytes: Vec<u8>) -> Result<String, IngestError> {
        match kind {
            FileKind::Pdf => {
                let text = tokio::task::spawn_blocking(move || extract_pdf_text(&bytes))
                    .await
                    .map_err(|e| IngestError::Task(e.to_string()))??;
                Ok(text)
            },
            FileKind::Image(format) => self.describe_image(format, &bytes).await,
        }
    }

    async fn describe_image(&self, format: ImageFormat, bytes: &[u8]) -> Result<String, IngestError> {
        let data_url = image_data_url(format, bytes)?;
        let description = self.assistant.describe_image(&data_url).await?;
        let description = description.trim();
        if description.is_empty() {
            return Err(UnprocessableReason::UnreadableImage.into());
        }
        Ok(description.to_owned())
    }

    /// Fetch a URL and extract its text. The source is always a `web` entry
    /// pointing at the requested URL.
    pub async fn extract_url(&self, url: &str) -> Result<Extracted, IngestError> {
        let (title, text) = self.fetch_text(url).await?;
        info!(url, chars = text.len(), "Extracted web page");
        Ok(Extracted::new(Source::web(title, url.trim()), text))
    }

    /// Fetch a URL and return its title and text.
    pub async fn fetch_text(&self, url: &str) -> Result<(String, String), IngestError> {
        validate_url(url)?;
        let url = url.trim();
        let page = self.fetcher.fetch(url).await?;
        if page.body.is_empty() {
            return Err(UnprocessableReason::NoTextContent.into());
        }
        self.page_text(url, page).await
    }

    async fn page_text(&self, url: &str, page: FetchedPage) -> Result<(String, String), IngestError> {
        let declared = page.content_type.as_deref().map(|c| c.to_ascii_lowercase());
        let kind = declared.as_deref().and_then(FileKind::from_content_type).or_else(|| sniff_kind(&page.body));
        debug!(url, content_type = ?declared, ?kind, "Dispatching fetched page");

        if let Some(kind) = kind {
            let text = self.file_text(kind, page.body).await?;
            return Ok((name_from_url(&page.url), text));
        }

        let is_html = declared.as_deref().is_none_or(|c| c.contains("html") || c.contains("xml"));
        let raw = String::from_utf8_lossy(&page.body);
        let (title, text) = if is_html || looks_like_html(&raw) {
            (html_title(&raw), html_to_text(&raw))
        } else if declared.as_deref().is_some_and(|c| c.starts_with("text/")) {
            (None, raw.trim().to_owned())
        } else {
            return Err(edumate_core::ValidationError::UnsupportedType(
                declared.unwrap_or_else(|| "unknown".to_owned()),
            )
            .into());
        };
        if text.trim().is_empty() {
            return Err(UnprocessableReason::NoTextContent.into());
        }
        Ok((title.unwrap_or_else(|| url.to_owned()), text))
    }
}

fn looks_like_html(raw: &str) -> bool {
    let head = raw.trim_start().get(..256).unwrap_or(raw.trim_start()).to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.contains("<html")
}

/// Last non-empty path segment, or the whole URL.
fn name_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url).trim_end_matches('/');
    path.rsplit('/')
        .next()
        .filter(|s| !s.is_empty() && path.matches('/').count() > 2)
        .map_or_else(|| url.to_owned(), str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_from_urls() {
        assert_eq!(name_from_url("https://example.com/files/syllabus.pdf?x=1"), "syllabus.pdf");
        assert_eq!(name_from_url("https://example.com/"), "https://example.com/");
        assert_eq!(name_from_url("https://example.com"), "https://example.com");
    }

    #[test]
    fn html_detection() {
        assert!(looks_like_html("  <!DOCTYPE html><html>"));
        assert!(!looks_like_html("plain words"));
    }
}
