//! Typed API error for HTTP handlers.
//!
//! Converts service errors into HTTP responses with a JSON body
//! `{"error", "detail", "retryable", "reason"?, "guidance"?}`.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use edumate_core::{UnprocessableReason, ValidationError};
use edumate_service::ServiceError;
use serde::Serialize;

/// Status used when the client went away before the reply was ready.
const CLIENT_CLOSED_REQUEST: u16 = 499;

/// API error with HTTP status code and human-readable detail.
///
/// `Internal` logs the real error server-side and returns a static message.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request: invalid input from caller.
    BadRequest(String),
    /// 401 Unauthorized: missing API key or caller identity.
    Unauthorized(String),
    /// 404 Not Found.
    NotFound(String),
    /// 409 Conflict: concurrent modification.
    Conflict(String),
    /// 413 Payload Too Large.
    PayloadTooLarge(String),
    /// 415 Unsupported Media Type.
    UnsupportedMediaType(String),
    /// 422 Unprocessable Entity: upload accepted but no usable content.
    Unprocessable(UnprocessableReason),
    /// 502 Bad Gateway: model, search or fetch failure.
    Upstream { detail: String, retryable: bool },
    /// 504 Gateway Timeout.
    Timeout(String),
    /// Client disconnected mid-request.
    Cancelled,
    /// 500 Internal Server Error. Details logged, not exposed.
    Internal(anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    detail: String,
    retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    guidance: Option<&'static str>,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Cancelled => {
                StatusCode::from_u16(CLIENT_CLOSED_REQUEST).unwrap_or(StatusCode::SERVICE_UNAVAILABLE)
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    const fn kind(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "invalid_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::PayloadTooLarge(_) => "file_too_large",
            Self::UnsupportedMediaType(_) => "unsupported_file_type",
            Self::Unprocessable(_) => "unprocessable_content",
            Self::Upstream { .. } => "upstream_error",
            Self::Timeout(_) => "timeout",
            Self::Cancelled => "cancelled",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        let (detail, retryable, reason, guidance) = match self {
            Self::BadRequest(msg)
            | Self::Unauthorized(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::PayloadTooLarge(msg)
            | Self::UnsupportedMediaType(msg) => (msg, false, None, None),
            Self::Unprocessable(reason) => {
                (reason.to_string(), false, Some(reason.code()), Some(reason.guidance()))
            },
            Self::Upstream { detail, retryable } => (detail, retryable, None, None),
            Self::Timeout(msg) => (msg, true, None, None),
            Self::Cancelled => ("request cancelled by client".to_owned(), true, None, None),
            Self::Internal(err) => {
                tracing::error!(error = ?err, "internal server error");
                ("internal server error".to_owned(), false, None, None)
            },
        };
        let body = ErrorBody { error: kind, detail, retryable, reason, guidance };
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::TooLarge { .. } => Self::PayloadTooLarge(err.to_string()),
            ValidationError::UnsupportedType(_) => Self::UnsupportedMediaType(err.to_string()),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(e) => e.into(),
            ServiceError::Unprocessable(reason) => Self::Unprocessable(reason),
            ServiceError::Upstream { .. } => {
                let retryable = err.is_retryable();
                Self::Upstream { detail: err.to_string(), retryable }
            },
            ServiceError::NotFound { .. } => Self::NotFound(err.to_string()),
            ServiceError::Unauthorized(msg) => Self::Unauthorized(msg),
            ServiceError::Conflict(msg) => Self::Conflict(msg),
            ServiceError::Timeout(_) => Self::Timeout(err.to_string()),
            ServiceError::Cancelled => Self::Cancelled,
            ServiceError::Storage(_) | ServiceError::Internal(_) => Self::Internal(err.into()),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(err.body_text())
        } else {
            Self::BadRequest(err.body_text())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(err.body_text())
        } else {
            Self::BadRequest(err.body_text())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_distinct_statuses() {
        assert_eq!(ApiError::from(ValidationError::too_large(11)).status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            ApiError::from(ValidationError::UnsupportedType("docx".to_owned())).status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            ApiError::from(ValidationError::Empty { field: "content" }).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn service_errors_map_to_statuses() {
        let upstream = ServiceError::Upstream { service: "llm", message: "503".to_owned(), retryable: true };
        assert_eq!(ApiError::from(upstream).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(ApiError::from(ServiceError::Timeout("chat".to_owned())).status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(ApiError::from(ServiceError::Cancelled).status().as_u16(), 499);
        assert_eq!(
            ApiError::from(ServiceError::Unprocessable(UnprocessableReason::Encrypted)).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ApiError::from(ServiceError::Conflict("stale".to_owned())).status(), StatusCode::CONFLICT);
    }
}
