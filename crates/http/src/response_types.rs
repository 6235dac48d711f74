//! Response types (Serialize)

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use edumate_core::{CurriculumSummary, GradedSubmission, Session, SessionInfo, Source, StepDetail, Turn};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

impl SuccessResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedSessionResponse {
    pub session_id: String,
    pub session_name: String,
}

#[derive(Debug, Serialize)]
pub struct SessionListItem {
    pub session_id: String,
    pub session_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SessionInfo> for SessionListItem {
    fn from(info: SessionInfo) -> Self {
        Self {
            session_id: info.id,
            session_name: info.name,
            created_at: info.created_at,
            updated_at: info.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionListItem>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub session_name: String,
    pub history: Vec<Turn>,
    pub processed_documents: Vec<String>,
    pub baseline_responses: BTreeMap<String, String>,
    pub use_web_search: bool,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        let processed_documents = session.processed_documents();
        Self {
            session_id: session.id,
            session_name: session.name,
            history: session.history,
            processed_documents,
            baseline_responses: session.baseline_responses,
            use_web_search: session.use_web_search,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SourcesResponse {
    pub sources: Vec<Source>,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub success: bool,
    pub source: Source,
    /// Distinct names of every source the session holds.
    pub sources: Vec<String>,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub content: String,
    pub sources: Vec<Source>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_response: Option<String>,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct CurriculumListResponse {
    pub curriculums: Vec<CurriculumSummary>,
}

#[derive(Debug, Serialize)]
pub struct DetailedStepsResponse {
    pub curriculum_id: String,
    /// Keyed by step index.
    pub detailed_steps: BTreeMap<usize, StepDetail>,
}

#[derive(Debug, Serialize)]
pub struct RoadmapResponse {
    pub curriculum_id: String,
    pub roadmap: String,
}

#[derive(Debug, Serialize)]
pub struct SubmissionListResponse {
    pub assignment_id: String,
    pub submissions: Vec<GradedSubmission>,
}
