use async_trait::async_trait;
use edumate_core::{GradedSubmission, GradingFeedback, GradingRecord, Submission};

use crate::error::StorageError;

/// Submissions and their grading records.
#[async_trait]
pub trait GradingStore: Send + Sync {
    /// Upsert the submission for `(assignment_id, student_id)` and replace its
    /// grading record in one transaction. The stored submission id is reused
    /// on re-submission.
    async fn save_grading(
        &self,
        assignment_id: &str,
        student_id: &str,
        file_name: &str,
        feedback: &GradingFeedback,
    ) -> Result<(Submission, GradingRecord), StorageError>;

    async fn get_grading(&self, submission_id: &str)
    -> Result<Option<GradingRecord>, StorageError>;

    async fn get_submission(&self, submission_id: &str)
    -> Result<Option<Submission>, StorageError>;

    /// Replace only the score of an existing record.
    async fn update_score(
        &self,
        submission_id: &str,
        score: u8,
    ) -> Result<GradingRecord, StorageError>;

    async fn list_submissions(
        &self,
        assignment_id: &str,
    ) -> Result<Vec<GradedSubmission>, StorageError>;
}
