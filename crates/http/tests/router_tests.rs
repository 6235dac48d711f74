#![expect(clippy::unwrap_used, reason = "test code")]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use edumate_core::constants::MAX_UPLOAD_BYTES;
use edumate_http::{AppState, create_router};
use edumate_ingest::{FetchedPage, IngestError, PageFetcher};
use edumate_llm::{Assistant, ChatModel, DisabledSearch, LlmError, Message, ReplyFormat};
use edumate_service::Services;
use edumate_storage::Storage;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

const SYLLABUS_URL: &str = "https://example.com/syllabus";
const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01";
const BOUNDARY: &str = "edumate-test-boundary";

struct CannedModel;

#[async_trait]
impl ChatModel for CannedModel {
    async fn complete(&self, messages: Vec<Message>, _format: ReplyFormat) -> Result<String, LlmError> {
        let prompt = messages.iter().map(Message::text).collect::<Vec<_>>().join("\n");
        let reply = if prompt.contains("reformulating questions") {
            messages.last().map(Message::text).unwrap_or_default()
        } else if prompt.contains("requires_search") {
            r#"{"requires_search": false}"#.to_owned()
        } else if prompt.contains("intelligent teaching assistant") {
            "The syllabus covers algebra over twelve weeks.".to_owned()
        } else if prompt.contains("own knowledge") {
            "A syllabus outlines a course.".to_owned()
        } else if prompt.contains("short, concise titles") {
            "Syllabus Overview".to_owned()
        } else if prompt.contains("Transcribe all readable text") {
            "Handwritten answers about photosynthesis.".to_owned()
        } else if prompt.contains("grading a student's submission") {
            r#"{"Name": "", "marks": "92", "remarks": ["Accurate"], "suggestions": [], "errors": []}"#.to_owned()
        } else {
            return Err(LlmError::MissingField("unexpected prompt".to_owned()));
        };
        Ok(reply)
    }
}

struct SyllabusSite;

#[async_trait]
impl PageFetcher for SyllabusSite {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, IngestError> {
        if url != SYLLABUS_URL {
            return Err(IngestError::FetchStatus { url: url.to_owned(), status: 404 });
        }
        Ok(FetchedPage {
            url: url.to_owned(),
            content_type: Some("text/html".to_owned()),
            body: b"<html><head><title>Course Syllabus</title></head><body><p>This syllabus covers \
                    algebra and geometry over twelve weeks.</p></body></html>"
                .to_vec(),
        })
    }
}

fn app(api_key: Option<&str>) -> (Router, TempDir) {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(Storage::new(&dir.path().join("edumate.db")).unwrap());
    let services = Services::new(
        storage,
        Assistant::new(Arc::new(CannedModel)),
        Arc::new(DisabledSearch),
        Arc::new(SyllabusSite),
        Duration::from_secs(30),
    );
    let state = Arc::new(AppState { services, api_key: api_key.map(str::to_owned) });
    (create_router(state), dir)
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_request(uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
}

fn multipart_body(file_name: &str, content_type: &str, bytes: &[u8]) -> Body {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
         Content-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    Body::from(body)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_is_open_even_with_api_key() {
    let (router, _dir) = app(Some("secret"));
    let (status, body) = send(&router, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn api_key_is_enforced_when_configured() {
    let (router, _dir) = app(Some("secret"));

    let (status, body) = send(&router, Request::get("/sessions").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
    assert_eq!(body["retryable"], false);

    let authorized = Request::get("/sessions").header("x-api-key", "secret").body(Body::empty()).unwrap();
    let (status, body) = send(&router, authorized).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessions"], json!([]));
}

#[tokio::test]
async fn syllabus_chat_end_to_end() {
    let (router, _dir) = app(None);

    let (status, created) = send(&router, json_request("POST", "/sessions", &json!({"session_name": "Algebra"}))).await;
    assert_eq!(status, StatusCode::OK);
    let session_id = created["session_id"].as_str().unwrap().to_owned();

    let (status, processed) = send(
        &router,
        json_request("POST", "/process/url", &json!({"url": SYLLABUS_URL, "session_id": session_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(processed["source"]["type"], "web");
    assert_eq!(processed["sources"], json!(["Course Syllabus"]));

    let (status, reply) = send(
        &router,
        json_request(
            "POST",
            "/chat",
            &json!({"content": "Summarize the syllabus", "session_id": session_id, "force_web_search": false}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["session_id"], session_id.as_str());
    let sources = reply["sources"].as_array().unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0]["type"], "web");
    assert_eq!(sources[0]["url"], SYLLABUS_URL);

    let (status, session) =
        send(&router, Request::get(format!("/sessions/{session_id}")).body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["history"].as_array().unwrap().len(), 2);
    assert_eq!(session["history"][0]["role"], "user");
    assert_eq!(session["processed_documents"], json!(["Course Syllabus"]));
    assert!(session["baseline_responses"]["user_msg_0"].is_string());
}

#[tokio::test]
async fn upload_errors_use_distinct_statuses() {
    let (router, _dir) = app(None);

    let unsupported = multipart_request("/process/document")
        .body(multipart_body("notes.docx", "application/octet-stream", b"PK\x03\x04"))
        .unwrap();
    let (status, body) = send(&router, unsupported).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["error"], "unsupported_file_type");

    let big = vec![0_u8; MAX_UPLOAD_BYTES + 1];
    let oversize =
        multipart_request("/process/document").body(multipart_body("big.pdf", "application/pdf", &big)).unwrap();
    let (status, body) = send(&router, oversize).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "file_too_large");

    let corrupt = multipart_request("/process/document")
        .body(multipart_body("broken.pdf", "application/pdf", b"%PDF-1.4 not really"))
        .unwrap();
    let (status, body) = send(&router, corrupt).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["reason"], "corrupt_or_unsupported");
    assert!(body["guidance"].is_string());
}

#[tokio::test]
async fn grading_requires_caller_identity() {
    let (router, _dir) = app(None);

    let anonymous = multipart_request("/class/grade-submission/essay-1")
        .body(multipart_body("essay.png", "image/png", PNG))
        .unwrap();
    let (status, _) = send(&router, anonymous).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let signed = multipart_request("/class/grade-submission/essay-1")
        .header("x-user-id", "student-3")
        .body(multipart_body("essay.png", "image/png", PNG))
        .unwrap();
    let (status, graded) = send(&router, signed).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(graded["student_id"], "student-3");
    assert_eq!(graded["grading"]["score"], 92);
    let submission_id = graded["id"].as_str().unwrap().to_owned();

    let (status, _) = send(
        &router,
        json_request("PUT", &format!("/class/updateScore/{submission_id}"), &json!({"score": 150})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, record) = send(
        &router,
        json_request("PUT", &format!("/class/updateScore/{submission_id}"), &json!({"score": 75})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["score"], 75);
    assert_eq!(record["remarks"], json!(["Accurate"]));

    let (status, listed) =
        send(&router, Request::get("/class/assignments/essay-1/submissions").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["submissions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_entities_are_not_found() {
    let (router, _dir) = app(None);
    for uri in ["/sessions/missing", "/curriculum/missing", "/class/submissions/missing/grading"] {
        let (status, body) = send(&router, Request::get(uri).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["error"], "not_found");
    }
    let (status, _) = send(
        &router,
        json_request("POST", "/chat", &json!({"content": "hi", "session_id": "missing"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sessions_can_be_renamed() {
    let (router, _dir) = app(None);
    let (_, created) = send(&router, json_request("POST", "/sessions", &json!({}))).await;
    let id = created["session_id"].as_str().unwrap().to_owned();

    let uri = format!("/sessions/{id}");
    let (status, body) = send(&router, json_request("PATCH", &uri, &json!({"session_name": "Biology"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_name"], "Biology");

    let (status, body) = send(&router, json_request("PATCH", &uri, &json!({"session_name": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");

    let (status, _) =
        send(&router, json_request("PATCH", "/sessions/missing", &json!({"session_name": "x"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_json_bodies_use_the_error_shape() {
    let (router, _dir) = app(None);
    let broken = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from("{\"content\": "))
        .unwrap();
    let (status, body) = send(&router, broken).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
    assert_eq!(body["retryable"], false);

    let (status, body) = send(&router, json_request("POST", "/chat", &json!({"session_id": "s1"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");

    let plain = Request::builder().method("POST").uri("/process/url").body(Body::from("https://example.com")).unwrap();
    let (status, body) = send(&router, plain).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");

    let bare = Request::builder().method("POST").uri("/sessions").body(Body::empty()).unwrap();
    let (status, body) = send(&router, bare).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_name"], "Untitled Session");
}
