use crate::ai_types::Message;
use crate::assistant::Assistant;
use crate::error::LlmError;

const DESCRIBE_PROMPT: &str = "Transcribe all readable text in this image, then describe its \
content (diagrams, tables, figures) in enough detail to answer questions about it. If the image \
is unreadable, reply with an empty message.";

impl Assistant {
    /// Describe an image given as a `data:` URL. May return an empty string
    /// when the model finds nothing readable.
    pub async fn describe_image(&self, image_data_url: &str) -> Result<String, LlmError> {
        self.ask_text(vec![Message::user_with_image(DESCRIBE_PROMPT, image_data_url)]).await
    }
}
