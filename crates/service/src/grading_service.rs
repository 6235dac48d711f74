use std::sync::Arc;
use std::time::Duration;

use edumate_core::{GradedSubmission, GradingRecord, Submission, ValidationError, validate_score, validate_upload};
use edumate_ingest::Extractor;
use edumate_llm::Assistant;
use edumate_storage::Storage;
use edumate_storage::traits::GradingStore;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::deadline::bounded;
use crate::error::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeRequest {
    pub assignment_id: String,
    /// Authenticated caller submitting the work.
    pub student_id: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradingOutcome {
    pub submission: Submission,
    pub record: GradingRecord,
}

pub struct GradingService {
    storage: Arc<Storage>,
    assistant: Assistant,
    extractor: Extractor,
    timeout: Duration,
}

impl GradingService {
    #[must_use]
    pub const fn new(storage: Arc<Storage>, assistant: Assistant, extractor: Extractor, timeout: Duration) -> Self {
        Self { storage, assistant, extractor, timeout }
    }

    /// Extract, grade and store a submission. Re-grading the same student's
    /// work for an assignment replaces the previous record.
    pub async fn grade(&self, request: GradeRequest, cancel: &CancellationToken) -> Result<GradingOutcome, ServiceError> {
        if request.student_id.trim().is_empty() {
            return Err(ServiceError::Unauthorized("a caller identity is required to submit work".to_owned()));
        }
        if request.assignment_id.trim().is_empty() {
            return Err(ValidationError::Empty { field: "assignment_id" }.into());
        }
        let kind = validate_upload(&request.file_name, request.content_type.as_deref(), request.bytes.len())?;

        bounded("grading", self.timeout, cancel, async {
            let text = self.extractor.file_text(kind, request.bytes).await?;
            let feedback = self.assistant.grade_submission(&text).await?;
            let (submission, record) = self
                .storage
                .save_grading(&request.assignment_id, &request.student_id, &request.file_name, &feedback)
                .await?;
            info!(
                submission_id = %submission.id,
                assignment_id = %submission.assignment_id,
                score = record.score,
                "Submission graded"
            );
            Ok(GradingOutcome { submission, record })
        })
        .await
    }

    /// Replace only the score of an existing record.
    pub async fn update_score(&self, submission_id: &str, score: i64) -> Result<GradingRecord, ServiceError> {
        let score = validate_score(score)?;
        let record = self.storage.update_score(submission_id, score).await?;
        info!(submission_id, score, "Score updated");
        Ok(record)
    }

    pub async fn get_grading(&self, submission_id: &str) -> Result<GradingRecord, ServiceError> {
        self.storage
            .get_grading(submission_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("grading record", submission_id))
    }

    pub async fn list_submissions(&self, assignment_id: &str) -> Result<Vec<GradedSubmission>, ServiceError> {
        Ok(self.storage.list_submissions(assignment_id).await?)
    }
}
