#![expect(clippy::unwrap_used, reason = "test code")]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use edumate_core::constants::MAX_UPLOAD_BYTES;
use edumate_core::{Source, UnprocessableReason, ValidationError};
use edumate_ingest::{Extractor, HttpFetcher, IngestError, PageFetcher};
use edumate_llm::{Assistant, ChatModel, LlmError, Message, ReplyFormat};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01";

/// Vision model stub returning a fixed description and counting calls.
struct FixedVision {
    reply: &'static str,
    calls: AtomicUsize,
}

#[async_trait]
impl ChatModel for FixedVision {
    async fn complete(&self, _messages: Vec<Message>, _format: ReplyFormat) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.to_owned())
    }
}

fn extractor(reply: &'static str) -> (Extractor, Arc<FixedVision>) {
    let model = Arc::new(FixedVision { reply, calls: AtomicUsize::new(0) });
    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(Duration::from_secs(5)).unwrap());
    (Extractor::new(Assistant::new(Arc::clone(&model) as Arc<dyn ChatModel>), fetcher), model)
}

#[tokio::test]
async fn html_page_becomes_web_source() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/syllabus"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html; charset=utf-8").set_body_string(
            "<html><head><title>Biology 101</title><script>var x;</script></head>\
             <body><h1>Syllabus</h1><p>Week 1: cells</p></body></html>",
        ))
        .mount(&server)
        .await;
    let (extractor, _) = extractor("unused");
    let url = format!("{}/syllabus", server.uri());

    let extracted = extractor.extract_url(&url).await.unwrap();

    assert!(matches!(&extracted.source, Source::Web { name, url: u, .. } if name == "Biology 101" && *u == url));
    assert!(extracted.text.contains("Week 1: cells"));
    assert!(!extracted.text.contains("var x"));
    assert_eq!(extracted.chunks.len(), 1);
}

#[tokio::test]
async fn error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(404)).mount(&server).await;
    let (extractor, _) = extractor("unused");

    let err = extractor.extract_url(&format!("{}/missing", server.uri())).await.unwrap_err();

    assert!(matches!(err, IngestError::FetchStatus { status: 404, .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn oversize_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(vec![b'a'; MAX_UPLOAD_BYTES + 1]),
        )
        .mount(&server)
        .await;
    let (extractor, _) = extractor("unused");

    let err = extractor.extract_url(&format!("{}/huge.pdf", server.uri())).await.unwrap_err();

    assert!(matches!(err, IngestError::Validation(ValidationError::TooLarge { .. })));
}

#[tokio::test]
async fn non_http_url_is_invalid() {
    let (extractor, _) = extractor("unused");
    let err = extractor.extract_url("ftp://example.com/file").await.unwrap_err();
    assert!(matches!(err, IngestError::Validation(ValidationError::InvalidUrl(_))));
}

#[tokio::test]
async fn oversize_upload_never_reaches_the_model() {
    let (extractor, model) = extractor("a picture");
    let err = extractor.extract_file("big.png", None, vec![0; MAX_UPLOAD_BYTES + 1]).await.unwrap_err();
    assert!(matches!(err, IngestError::Validation(ValidationError::TooLarge { .. })));
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unsupported_upload_type() {
    let (extractor, _) = extractor("unused");
    let err = extractor.extract_file("notes.docx", None, b"PK..".to_vec()).await.unwrap_err();
    assert!(matches!(err, IngestError::Validation(ValidationError::UnsupportedType(ext)) if ext == "docx"));
}

#[tokio::test]
async fn image_is_described() {
    let (extractor, model) = extractor("A labelled diagram of a plant cell.");
    let extracted = extractor.extract_file("cell.png", Some("image/png"), PNG.to_vec()).await.unwrap();
    assert_eq!(extracted.source.kind(), "image");
    assert_eq!(extracted.text, "A labelled diagram of a plant cell.");
    assert_eq!(model.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn blank_description_means_unreadable_image() {
    let (extractor, _) = extractor("   ");
    let err = extractor.extract_file("cell.png", None, PNG.to_vec()).await.unwrap_err();
    assert!(matches!(err, IngestError::Unprocessable(UnprocessableReason::UnreadableImage)));
}

#[tokio::test]
async fn wrong_image_signature_is_unreadable() {
    let (extractor, model) = extractor("never asked");
    let err = extractor.extract_file("photo.jpg", None, PNG.to_vec()).await.unwrap_err();
    assert!(matches!(err, IngestError::Unprocessable(UnprocessableReason::UnreadableImage)));
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}
