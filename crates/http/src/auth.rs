//! Per-request auth context.
//!
//! The API key guards every route except health and version when one is
//! configured. Grading additionally needs the caller's identity.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;

use crate::AppState;
use crate::api_error::ApiError;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const USER_ID_HEADER: &str = "x-user-id";

/// Reject requests whose `X-API-Key` does not match the configured key.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(expected) = state.api_key.as_deref() {
        let provided = request.headers().get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
        if provided != Some(expected) {
            tracing::warn!(path = %request.uri().path(), "Rejected request with missing or invalid API key");
            return Err(ApiError::Unauthorized("missing or invalid API key".to_owned()));
        }
    }
    Ok(next.run(request).await)
}

/// Identity of the caller, taken from `X-User-Id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub String);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| Self(v.to_owned()))
            .ok_or_else(|| ApiError::Unauthorized("X-User-Id header is required".to_owned()))
    }
}
