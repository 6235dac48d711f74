//! Ingestion error types

use edumate_core::{UnprocessableReason, ValidationError};
use edumate_llm::LlmError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Unprocessable(UnprocessableReason),

    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("fetching {url} returned HTTP {status}")]
    FetchStatus { url: String, status: u16 },

    #[error("model request failed: {0}")]
    Llm(#[from] LlmError),

    #[error("client initialization failed: {0}")]
    ClientInit(String),

    #[error("extraction task failed: {0}")]
    Task(String),
}

impl From<UnprocessableReason> for IngestError {
    fn from(reason: UnprocessableReason) -> Self {
        Self::Unprocessable(reason)
    }
}

impl IngestError {
    /// Whether trying again later could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch { .. } => true,
            Self::FetchStatus { status, .. } => matches!(status, 408 | 429 | 500..=599),
            Self::Llm(e) => e.is_retryable(),
            _ => false,
        }
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Fetch { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}
