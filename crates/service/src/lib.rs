//! Service layer for EduMate
//!
//! Business logic between the HTTP handlers and storage, ingestion and the model.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::cognitive_complexity, reason = "Complex async flows are inherent")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

mod chat_service;
mod curriculum_service;
mod deadline;
mod error;
mod grading_service;
mod ingestion_service;
mod locks;
mod session_service;
#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use edumate_ingest::{Extractor, PageFetcher};
use edumate_llm::{Assistant, WebSearch};
use edumate_storage::Storage;

pub use chat_service::{ChatReply, ChatRequest, ChatService};
pub use curriculum_service::{CurriculumService, NewCurriculum};
pub use error::ServiceError;
pub use grading_service::{GradeRequest, GradingOutcome, GradingService};
pub use ingestion_service::{IngestOutcome, IngestionService};
pub use locks::KeyedLocks;
pub use session_service::SessionService;

/// Every service, wired to the same storage, model and per-session locks.
#[derive(Clone)]
pub struct Services {
    pub sessions: Arc<SessionService>,
    pub ingestion: Arc<IngestionService>,
    pub chat: Arc<ChatService>,
    pub grading: Arc<GradingService>,
    pub curricula: Arc<CurriculumService>,
}

impl Services {
    #[must_use]
    pub fn new(
        storage: Arc<Storage>,
        assistant: Assistant,
        search: Arc<dyn WebSearch>,
        fetcher: Arc<dyn PageFetcher>,
        request_timeout: Duration,
    ) -> Self {
        let locks = KeyedLocks::default();
        let extractor = Extractor::new(assistant.clone(), fetcher);
        let ingestion = Arc::new(IngestionService::new(
            Arc::clone(&storage),
            extractor.clone(),
            locks.clone(),
            request_timeout,
        ));
        let chat = Arc::new(ChatService::new(
            Arc::clone(&storage),
            assistant.clone(),
            Arc::clone(&search),
            Arc::clone(&ingestion),
            locks,
            request_timeout,
        ));
        let grading = Arc::new(GradingService::new(
            Arc::clone(&storage),
            assistant.clone(),
            extractor.clone(),
            request_timeout,
        ));
        let curricula = Arc::new(CurriculumService::new(
            Arc::clone(&storage),
            assistant,
            extractor,
            search,
            request_timeout,
        ));
        Self { sessions: Arc::new(SessionService::new(storage)), ingestion, chat, grading, curricula }
    }
}
