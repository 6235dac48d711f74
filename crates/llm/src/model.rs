use async_trait::async_trait;

use crate::ai_types::Message;
use crate::error::LlmError;

/// Whether a completion should be constrained to a JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyFormat {
    Text,
    Json,
}

/// A chat-completion backend. [`crate::LlmClient`] is the production one.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: Vec<Message>, format: ReplyFormat) -> Result<String, LlmError>;
}
