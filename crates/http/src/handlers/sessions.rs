use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};

use crate::AppState;
use crate::api_error::ApiError;
use crate::request_types::{ApiJson, CreateSessionRequest, RenameSessionRequest};
use crate::response_types::{
    CreatedSessionResponse, SessionListResponse, SessionResponse, SourcesResponse, SuccessResponse,
};

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    body: Option<ApiJson<CreateSessionRequest>>,
) -> Result<Json<CreatedSessionResponse>, ApiError> {
    let name = body.and_then(|ApiJson(req)| req.session_name);
    let session = state.services.sessions.create(name).await?;
    Ok(Json(CreatedSessionResponse { session_id: session.id, session_name: session.name }))
}

pub async fn list_sessions(State(state): State<Arc<AppState>>) -> Result<Json<SessionListResponse>, ApiError> {
    let sessions = state.services.sessions.list().await?;
    Ok(Json(SessionListResponse { sessions: sessions.into_iter().map(Into::into).collect() }))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state.services.sessions.get(&id).await?;
    Ok(Json(session.into()))
}

pub async fn rename_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<RenameSessionRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    state.services.sessions.rename(&id, &req.session_name).await?;
    let session = state.services.sessions.get(&id).await?;
    Ok(Json(session.into()))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.services.sessions.delete(&id).await?;
    Ok(Json(SuccessResponse::ok(format!("Session {id} deleted"))))
}

pub async fn get_sources(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SourcesResponse>, ApiError> {
    let sources = state.services.sessions.sources(&id).await?;
    Ok(Json(SourcesResponse { sources }))
}
