#![allow(clippy::single_call_fn, reason = "HTTP handlers are called once from router")]

pub mod chat;
pub mod curriculum;
pub mod grading;
pub mod ingest;
pub mod sessions;

use axum::extract::Multipart;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::api_error::ApiError;

/// Token that fires when the handler future is dropped, which is what
/// happens when the client disconnects.
pub(crate) fn request_token() -> (CancellationToken, DropGuard) {
    let token = CancellationToken::new();
    let guard = token.clone().drop_guard();
    (token, guard)
}

/// A file read from a multipart body, plus any text fields sent with it.
pub(crate) struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub session_id: Option<String>,
}

/// Read the `file` field and an optional `session_id` field.
pub(crate) async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    let mut file = None;
    let mut session_id = None;
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_owned();
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field.bytes().await?;
                file = Some((file_name, content_type, bytes.to_vec()));
            },
            Some("session_id") => {
                let text = field.text().await?;
                session_id = Some(text.trim().to_owned()).filter(|s| !s.is_empty());
            },
            _ => {},
        }
    }
    let (file_name, content_type, bytes) =
        file.ok_or_else(|| ApiError::BadRequest("multipart field 'file' is required".to_owned()))?;
    Ok(Upload { file_name, content_type, bytes, session_id })
}
