use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::truncate;
use crate::error::LlmError;

const SEARCH_TIMEOUT: Duration = Duration::from_secs(20);

/// One web search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, LlmError>;
}

/// Search backend used when no search endpoint is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSearch;

#[async_trait]
impl WebSearch for DisabledSearch {
    async fn search(&self, query: &str, _limit: usize) -> Result<Vec<SearchHit>, LlmError> {
        tracing::debug!(query, "Web search requested but no search endpoint is configured");
        Ok(Vec::new())
    }
}

/// Client for a SearxNG instance's JSON API (`/search?format=json`).
#[derive(Debug, Clone)]
pub struct SearxSearch {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct SearxResponse {
    #[serde(default)]
    results: Vec<SearxResult>,
}

#[derive(Deserialize)]
struct SearxResult {
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
}

impl SearxSearch {
    pub fn new(base_url: &str) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .build()
            .map_err(|e| LlmError::ClientInit(e.to_string()))?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_owned() })
    }
}

#[async_trait]
impl WebSearch for SearxSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, LlmError> {
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", query), ("format", "json")])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(LlmError::HttpStatus { code: status.as_u16(), body: truncate(&body, 500).to_owned() });
        }
        let parsed: SearxResponse = serde_json::from_str(&body).map_err(|e| LlmError::JsonParse {
            context: format!("search response (body: {})", truncate(&body, 200)),
            source: e,
        })?;
        let hits: Vec<SearchHit> = parsed
            .results
            .into_iter()
            .filter(|r| r.url.starts_with("http://") || r.url.starts_with("https://"))
            .take(limit)
            .map(|r| SearchHit {
                title: if r.title.trim().is_empty() { r.url.clone() } else { r.title.trim().to_owned() },
                url: r.url,
                snippet: r.content.trim().to_owned(),
            })
            .collect();
        tracing::debug!(query, hits = hits.len(), "Web search completed");
        Ok(hits)
    }
}
