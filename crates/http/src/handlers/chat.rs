use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use edumate_service::ChatRequest;

use super::request_token;
use crate::AppState;
use crate::api_error::ApiError;
use crate::request_types::{ApiJson, ChatMessageRequest};
use crate::response_types::ChatResponse;

pub async fn chat(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ChatMessageRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let (cancel, _guard) = request_token();
    let request = ChatRequest {
        content: req.content,
        session_id: req.session_id,
        force_web_search: req.force_web_search,
    };
    let reply = state.services.chat.respond(request, &cancel).await?;
    Ok(Json(ChatResponse {
        content: reply.content,
        sources: reply.sources,
        baseline_response: reply.baseline_response,
        session_id: reply.session_id,
    }))
}
