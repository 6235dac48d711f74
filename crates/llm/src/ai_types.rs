//! Wire types for the OpenAI-compatible chat completions API, plus the JSON
//! shapes the prompts ask the model to return.

use edumate_core::{LearningResource, PracticeExercise, StepConnections};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

impl ResponseFormat {
    #[must_use]
    pub fn json_object() -> Self {
        Self { format_type: "json_object".to_owned() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: String,
    pub content: MessageContent,
}

impl Message {
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self { role: "system".to_owned(), content: MessageContent::Text(text.into()) }
    }

    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: "user".to_owned(), content: MessageContent::Text(text.into()) }
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self { role: "assistant".to_owned(), content: MessageContent::Text(text.into()) }
    }

    /// A user message carrying a prompt and one inline image (`data:` URL).
    #[must_use]
    pub fn user_with_image(text: impl Into<String>, image_data_url: impl Into<String>) -> Self {
        Self {
            role: "user".to_owned(),
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: text.into() },
                ContentPart::ImageUrl { image_url: ImageUrl { url: image_data_url.into() } },
            ]),
        }
    }

    /// Text of the message, ignoring image parts.
    #[must_use]
    pub fn text(&self) -> String {
        match &self.content {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Deserialize)]
pub(crate) struct ChatResponse {
    pub choices: Vec<Choice>,
}

#[derive(Deserialize)]
pub(crate) struct Choice {
    pub message: ResponseMessage,
}

#[derive(Deserialize)]
pub(crate) struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct IntentJson {
    #[serde(default)]
    pub requires_search: bool,
}

#[derive(Deserialize)]
pub(crate) struct GradingJson {
    #[serde(default, rename = "Name", alias = "name")]
    pub name: Option<String>,
    #[serde(default, alias = "score")]
    pub marks: Option<serde_json::Value>,
    #[serde(default)]
    pub remarks: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub errors: Vec<String>,
}

#[derive(Deserialize)]
pub(crate) struct OutlineJson {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub steps: Vec<OutlineStepJson>,
}

#[derive(Deserialize)]
pub(crate) struct OutlineStepJson {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub estimated_time: String,
}

/// Step detail as the model returns it. Title and time come from the outline.
#[derive(Deserialize)]
pub(crate) struct StepDetailJson {
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub subtopics: Vec<String>,
    #[serde(default)]
    pub core_concepts: String,
    #[serde(default)]
    pub learning_resources: Vec<LearningResource>,
    #[serde(default)]
    pub practice_exercises: Vec<PracticeExercise>,
    #[serde(default)]
    pub assessment_methods: String,
    #[serde(default)]
    pub advanced_topics: Vec<String>,
    #[serde(default)]
    pub connections: StepConnections,
}
