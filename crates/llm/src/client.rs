use std::time::Duration;

use async_trait::async_trait;
use edumate_core::env_config::env_non_empty;

use crate::ai_types::{ChatRequest, ChatResponse, Message, ResponseFormat};
use crate::error::LlmError;
use crate::model::{ChatModel, ReplyFormat};

/// Default model used when `EDUMATE_LLM_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_RETRIES: usize = 3;
const RETRY_DELAYS: [u64; 4] = [0, 1, 2, 4];

/// Client for an OpenAI-compatible chat completions endpoint.
pub struct LlmClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    retry_unit: Duration,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl LlmClient {
    /// Creates a client for `base_url` (without the `/v1/...` suffix).
    ///
    /// The model comes from `EDUMATE_LLM_MODEL`, falling back to [`DEFAULT_MODEL`].
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(api_key: String, base_url: String) -> Result<Self, LlmError> {
        let model = env_non_empty("EDUMATE_LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_owned());
        let base_url = base_url.trim_end_matches('/').to_owned();
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LlmError::ClientInit(e.to_string()))?;
        Ok(Self { client, api_key, base_url, model, retry_unit: Duration::from_secs(1) })
    }

    /// Sets a custom model for this client.
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Scale the retry backoff. One unit is one second in production.
    #[must_use]
    pub const fn with_retry_unit(mut self, unit: Duration) -> Self {
        self.retry_unit = unit;
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a chat completion request and return the extracted content string.
    ///
    /// Transient failures (network, 429, 5xx) are retried with a 0/1/2/4 unit
    /// backoff before giving up with [`LlmError::RetriesExhausted`].
    pub async fn chat_completion(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let units = RETRY_DELAYS.get(attempt).copied().unwrap_or(4);
                let delay = self.retry_unit.saturating_mul(u32::try_from(units).unwrap_or(4));
                tokio::time::sleep(delay).await;
                tracing::warn!(attempt, max = MAX_RETRIES, ?delay, "LLM retry");
            }

            let response = match self
                .client
                .post(format!("{}/v1/chat/completions", self.base_url))
                .bearer_auth(&self.api_key)
                .json(request)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::HttpRequest(e));
                    continue;
                },
            };

            let status = response.status();
            if status.is_success() {
                let body = match response.text().await {
                    Ok(b) => b,
                    Err(e) => {
                        last_error = Some(LlmError::HttpRequest(e));
                        continue;
                    },
                };

                let chat_response: ChatResponse =
                    serde_json::from_str(&body).map_err(|e| LlmError::JsonParse {
                        context: format!("chat completion response (body: {})", truncate(&body, 200)),
                        source: e,
                    })?;

                let content = chat_response
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.message.content)
                    .filter(|c| !c.trim().is_empty())
                    .ok_or(LlmError::EmptyResponse)?;
                return Ok(content);
            }

            let code = status.as_u16();
            let body =
                response.text().await.unwrap_or_else(|_| "Could not read error body".to_owned());
            let err = LlmError::HttpStatus { code, body: truncate(&body, 500).to_owned() };
            if err.is_transient() {
                last_error = Some(err);
                continue;
            }
            return Err(err);
        }

        Err(LlmError::RetriesExhausted(Box::new(last_error.unwrap_or(LlmError::EmptyResponse))))
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete(&self, messages: Vec<Message>, format: ReplyFormat) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            response_format: match format {
                ReplyFormat::Text => None,
                ReplyFormat::Json => Some(ResponseFormat::json_object()),
            },
        };
        self.chat_completion(&request).await
    }
}

/// Truncates a string to the given maximum byte length at a char boundary.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end = end.saturating_sub(1);
        }
        s.get(..end).unwrap_or("")
    }
}
