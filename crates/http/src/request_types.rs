//! Request body types (Deserialize)

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, OptionalFromRequest, Request};
use serde::Deserialize;

use crate::api_error::ApiError;

/// `Json` body whose rejections use the API error shape.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = <Json<T> as FromRequest<S>>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// A missing body is `None`; a malformed one is still rejected.
impl<T, S> OptionalFromRequest<S> for ApiJson<T>
where
    Json<T>: OptionalFromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let value = <Json<T> as OptionalFromRequest<S>>::from_request(req, state).await?;
        Ok(value.map(|Json(inner)| Self(inner)))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub session_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameSessionRequest {
    pub session_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ProcessUrlRequest {
    pub url: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatMessageRequest {
    pub content: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub force_web_search: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateCurriculumRequest {
    pub subject: String,
    #[serde(default)]
    pub syllabus_url: Option<String>,
    #[serde(default)]
    pub time_constraint: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ModifyCurriculumRequest {
    pub modification_text: String,
}

#[derive(Debug, Deserialize)]
pub struct NamedCurriculumRequest {
    pub curriculum_name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateScoreRequest {
    pub score: i64,
}
