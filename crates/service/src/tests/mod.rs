//! Fakes and module declarations for service tests.

#![expect(clippy::unwrap_used, reason = "test code")]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use edumate_ingest::{FetchedPage, IngestError, PageFetcher};
use edumate_llm::{Assistant, ChatModel, LlmError, Message, ReplyFormat, SearchHit, WebSearch};
use edumate_storage::Storage;
use tempfile::TempDir;

use crate::Services;

pub const SYLLABUS_URL: &str = "https://example.com/syllabus";
pub const SYLLABUS_HTML: &str = "<html><head><title>Course Syllabus</title></head><body>\
    <h1>Algebra</h1><p>This syllabus covers linear equations, polynomials and quadratic functions \
    over twelve weeks.</p></body></html>";
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01";

/// Model stand-in that answers by recognising which prompt it was given.
#[derive(Default)]
pub struct FakeModel {
    pub fail_answers: AtomicBool,
    pub slow: AtomicBool,
    pub slow_title: AtomicBool,
    pub wants_search: AtomicBool,
    pub answers: AtomicUsize,
    pub details: AtomicUsize,
}

const OUTLINE: &str = r#"{"title": "Linear Algebra Basics", "overview": "From vectors to eigenvalues.",
  "steps": [{"title": "Vectors", "estimated_time": "1 week"},
            {"title": "Matrices", "estimated_time": "2 weeks"},
            {"title": "Eigenvalues", "estimated_time": "1 week"}]}"#;

const MODIFIED_OUTLINE: &str = r#"{"title": "Linear Algebra Sprint", "overview": "",
  "steps": [{"title": "Vectors and Matrices", "estimated_time": "1 week"},
            {"title": "Eigenvalues", "estimated_time": "1 week"}]}"#;

const STEP_DETAIL: &str = r#"{"learning_objectives": ["Work with the core objects"],
  "subtopics": ["Notation"], "core_concepts": "Definitions and operations.",
  "learning_resources": [{"title": "Intro", "url": "https://learn.example/intro", "description": "Article", "type": "essential"}],
  "practice_exercises": [{"title": "Drill", "description": "Ten problems", "difficulty": "easy"}]}"#;

const GRADING: &str = r#"{"Name": "Ada", "marks": 140, "remarks": ["Clear structure., Good sources"],
  "suggestions": ["Cite more"], "errors": []}"#;

#[async_trait]
impl ChatModel for FakeModel {
    async fn complete(&self, messages: Vec<Message>, _format: ReplyFormat) -> Result<String, LlmError> {
        let prompt = messages.iter().map(Message::text).collect::<Vec<_>>().join("\n");
        let question = messages.last().map(Message::text).unwrap_or_default();
        let reply = if prompt.contains("reformulating questions") {
            question
        } else if prompt.contains("requires_search") {
            format!("{{\"requires_search\": {}}}", self.wants_search.load(Ordering::SeqCst))
        } else if prompt.contains("intelligent teaching assistant") {
            if self.slow.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            if self.fail_answers.load(Ordering::SeqCst) {
                return Err(LlmError::HttpStatus { code: 503, body: "overloaded".to_owned() });
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
            let n = self.answers.fetch_add(1, Ordering::SeqCst);
            format!("Grounded answer {n}")
        } else if prompt.contains("own knowledge") {
            "Baseline answer".to_owned()
        } else if prompt.contains("short, concise titles") {
            if self.slow_title.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            "\"Algebra Study Chat\"".to_owned()
        } else if prompt.contains("grading a student's submission") {
            GRADING.to_owned()
        } else if prompt.contains("Create a curriculum overview") {
            OUTLINE.to_owned()
        } else if prompt.contains("Modify it according to these instructions") {
            MODIFIED_OUTLINE.to_owned()
        } else if prompt.contains("Expand this curriculum step") {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let n = self.details.fetch_add(1, Ordering::SeqCst);
            STEP_DETAIL.replace("Definitions and operations.", &format!("Definitions and operations, draft {n}."))
        } else if prompt.contains("Transcribe all readable text") {
            "Essay on photosynthesis: plants convert light into chemical energy.".to_owned()
        } else {
            return Err(LlmError::MissingField(format!("unexpected prompt: {prompt}")));
        };
        Ok(reply)
    }
}

/// Serves fixed pages; everything else is a 404.
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, (String, String)>,
}

impl FakeFetcher {
    pub fn with_page(mut self, url: &str, content_type: &str, body: &str) -> Self {
        self.pages.insert(url.to_owned(), (content_type.to_owned(), body.to_owned()));
        self
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, IngestError> {
        let (content_type, body) = self
            .pages
            .get(url)
            .ok_or_else(|| IngestError::FetchStatus { url: url.to_owned(), status: 404 })?;
        Ok(FetchedPage { url: url.to_owned(), content_type: Some(content_type.clone()), body: body.clone().into_bytes() })
    }
}

#[derive(Default)]
pub struct FakeSearch {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
}

#[async_trait]
impl WebSearch for FakeSearch {
    async fn search(&self, query: &str, _limit: usize) -> Result<Vec<SearchHit>, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(LlmError::HttpStatus { code: 502, body: "search down".to_owned() });
        }
        Ok(vec![SearchHit {
            title: "Search result".to_owned(),
            url: "https://search.example/result".to_owned(),
            snippet: format!("Background for {query}"),
        }])
    }
}

pub struct Harness {
    pub services: Services,
    pub storage: Arc<Storage>,
    pub model: Arc<FakeModel>,
    pub search: Arc<FakeSearch>,
    _dir: TempDir,
}

pub fn harness() -> Harness {
    harness_with_timeout(Duration::from_secs(30))
}

pub fn harness_with_timeout(timeout: Duration) -> Harness {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(Storage::new(&dir.path().join("edumate.db")).unwrap());
    let model = Arc::new(FakeModel::default());
    let search = Arc::new(FakeSearch::default());
    let fetcher = FakeFetcher::default().with_page(SYLLABUS_URL, "text/html; charset=utf-8", SYLLABUS_HTML);
    let services = Services::new(
        Arc::clone(&storage),
        Assistant::new(Arc::clone(&model) as Arc<dyn ChatModel>),
        Arc::clone(&search) as Arc<dyn WebSearch>,
        Arc::new(fetcher),
        timeout,
    );
    Harness { services, storage, model, search, _dir: dir }
}

mod curriculum_tests;
