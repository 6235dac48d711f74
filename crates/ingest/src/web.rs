//! Fetching remote documents.

use std::time::Duration;

use async_trait::async_trait;
use edumate_core::ValidationError;
use edumate_core::constants::MAX_UPLOAD_BYTES;

use crate::error::IngestError;

/// A downloaded response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// URL after redirects.
    pub url: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, IngestError>;
}

/// reqwest-backed fetcher with a timeout and the upload size ceiling.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, IngestError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("edumate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| IngestError::ClientInit(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, IngestError> {
        let fetch_err = |source| IngestError::Fetch { url: url.to_owned(), source };
        let mut response = self.client.get(url).send().await.map_err(fetch_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::FetchStatus { url: url.to_owned(), status: status.as_u16() });
        }
        if let Some(len) = response.content_length() {
            let len = usize::try_from(len).unwrap_or(usize::MAX);
            if len > MAX_UPLOAD_BYTES {
                return Err(ValidationError::too_large(len).into());
            }
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(fetch_err)? {
            if body.len().saturating_add(chunk.len()) > MAX_UPLOAD_BYTES {
                return Err(ValidationError::too_large(body.len().saturating_add(chunk.len())).into());
            }
            body.extend_from_slice(&chunk);
        }
        tracing::debug!(url, bytes = body.len(), content_type = ?content_type, "Fetched page");
        Ok(FetchedPage { url: final_url, content_type, body })
    }
}
