//! Typed error enum for the service layer.
//!
//! Folds storage, model, search and ingestion failures into the taxonomy the
//! HTTP layer maps onto status codes.

use edumate_core::{UnprocessableReason, ValidationError};
use edumate_ingest::IngestError;
use edumate_llm::LlmError;
use edumate_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller input rejected before any work started.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Well-formed input that yielded no usable content.
    #[error("{0}")]
    Unprocessable(UnprocessableReason),

    /// Model, search or fetch dependency failed.
    #[error("{service} request failed: {message}")]
    Upstream { service: &'static str, message: String, retryable: bool },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Concurrent modification detected.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("{0} timed out")]
    Timeout(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("storage: {0}")]
    Storage(StorageError),

    #[error("internal: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Whether the same request may succeed if retried later.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Upstream { retryable, .. } => *retryable,
            Self::Timeout(_) => true,
            Self::Storage(e) => e.is_transient(),
            _ => false,
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { entity, id: id.into() }
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity, id } => Self::NotFound { entity, id },
            StorageError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Storage(other),
        }
    }
}

impl From<LlmError> for ServiceError {
    fn from(err: LlmError) -> Self {
        Self::Upstream { service: "llm", retryable: err.is_retryable(), message: err.to_string() }
    }
}

impl From<IngestError> for ServiceError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Validation(e) => Self::Validation(e),
            IngestError::Unprocessable(reason) => Self::Unprocessable(reason),
            IngestError::Llm(e) => e.into(),
            e if e.is_timeout() => Self::Timeout(e.to_string()),
            e @ (IngestError::Fetch { .. } | IngestError::FetchStatus { .. }) => Self::Upstream {
                service: "fetch",
                retryable: e.is_retryable(),
                message: e.to_string(),
            },
            e @ (IngestError::ClientInit(_) | IngestError::Task(_)) => Self::Internal(e.to_string()),
        }
    }
}
