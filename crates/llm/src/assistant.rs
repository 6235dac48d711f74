use std::sync::Arc;

use edumate_core::json_utils::extract_json_object;
use serde::de::DeserializeOwned;

use crate::ai_types::Message;
use crate::client::truncate;
use crate::error::LlmError;
use crate::model::{ChatModel, ReplyFormat};

/// Prompt builders on top of a [`ChatModel`].
///
/// Each task lives in its own module (`chat`, `vision`, `grading`,
/// `curriculum`) as an `impl Assistant` block.
#[derive(Clone)]
pub struct Assistant {
    model: Arc<dyn ChatModel>,
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant").finish_non_exhaustive()
    }
}

impl Assistant {
    #[must_use]
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub(crate) async fn ask_text(&self, messages: Vec<Message>) -> Result<String, LlmError> {
        let reply = self.model.complete(messages, ReplyFormat::Text).await?;
        Ok(reply.trim().to_owned())
    }

    /// Ask for a JSON object and deserialize it, tolerating code fences and
    /// prose around the object.
    pub(crate) async fn ask_json<T: DeserializeOwned>(
        &self,
        context: &str,
        messages: Vec<Message>,
    ) -> Result<T, LlmError> {
        let reply = self.model.complete(messages, ReplyFormat::Json).await?;
        let object = extract_json_object(&reply).ok_or_else(|| {
            LlmError::MissingField(format!("JSON object in {context} reply: {}", truncate(&reply, 200)))
        })?;
        serde_json::from_str(object).map_err(|e| LlmError::JsonParse {
            context: format!("{context} (content: {})", truncate(object, 300)),
            source: e,
        })
    }
}
