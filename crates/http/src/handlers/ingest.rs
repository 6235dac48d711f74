use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, State};
use edumate_service::IngestOutcome;

use super::{read_upload, request_token};
use crate::AppState;
use crate::api_error::ApiError;
use crate::request_types::{ApiJson, ProcessUrlRequest};
use crate::response_types::ProcessResponse;

fn process_response(outcome: IngestOutcome) -> ProcessResponse {
    ProcessResponse {
        success: true,
        source: outcome.source,
        sources: outcome.processed_documents,
        session_id: outcome.session_id,
    }
}

pub async fn process_document(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ProcessResponse>, ApiError> {
    let upload = read_upload(multipart).await?;
    let (cancel, _guard) = request_token();
    let outcome = state
        .services
        .ingestion
        .ingest_file(
            &upload.file_name,
            upload.content_type.as_deref(),
            upload.bytes,
            upload.session_id.as_deref(),
            &cancel,
        )
        .await?;
    Ok(Json(process_response(outcome)))
}

pub async fn process_url(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ProcessUrlRequest>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let (cancel, _guard) = request_token();
    let session_id = req.session_id.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let outcome = state.services.ingestion.ingest_url(req.url.trim(), session_id, &cancel).await?;
    Ok(Json(process_response(outcome)))
}
