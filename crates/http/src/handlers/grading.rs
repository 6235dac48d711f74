use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, Path, State};
use edumate_core::{GradedSubmission, GradingRecord};
use edumate_service::GradeRequest;

use super::{read_upload, request_token};
use crate::AppState;
use crate::api_error::ApiError;
use crate::auth::Caller;
use crate::request_types::{ApiJson, UpdateScoreRequest};
use crate::response_types::SubmissionListResponse;

pub async fn grade_submission(
    State(state): State<Arc<AppState>>,
    Caller(student_id): Caller,
    Path(assignment_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<GradedSubmission>, ApiError> {
    let upload = read_upload(multipart).await?;
    let (cancel, _guard) = request_token();
    let request = GradeRequest {
        assignment_id,
        student_id,
        file_name: upload.file_name,
        content_type: upload.content_type,
        bytes: upload.bytes,
    };
    let outcome = state.services.grading.grade(request, &cancel).await?;
    Ok(Json(GradedSubmission { submission: outcome.submission, grading: Some(outcome.record) }))
}

pub async fn update_score(
    State(state): State<Arc<AppState>>,
    Path(submission_id): Path<String>,
    ApiJson(req): ApiJson<UpdateScoreRequest>,
) -> Result<Json<GradingRecord>, ApiError> {
    Ok(Json(state.services.grading.update_score(&submission_id, req.score).await?))
}

pub async fn get_grading(
    State(state): State<Arc<AppState>>,
    Path(submission_id): Path<String>,
) -> Result<Json<GradingRecord>, ApiError> {
    Ok(Json(state.services.grading.get_grading(&submission_id).await?))
}

pub async fn list_submissions(
    State(state): State<Arc<AppState>>,
    Path(assignment_id): Path<String>,
) -> Result<Json<SubmissionListResponse>, ApiError> {
    let submissions = state.services.grading.list_submissions(&assignment_id).await?;
    Ok(Json(SubmissionListResponse { assignment_id, submissions }))
}
