use edumate_core::Turn;
use edumate_core::constants::DEFAULT_SESSION_NAME;
use edumate_core::text::shorten;

use crate::ai_types::{IntentJson, Message};
use crate::assistant::Assistant;
use crate::error::LlmError;
use crate::search::SearchHit;

/// Most recent turns replayed to the model as conversation context.
const HISTORY_WINDOW: usize = 10;
const MAX_TITLE_CHARS: usize = 60;

const REWRITE_PROMPT: &str = "You are an expert at reformulating questions to be more precise and \
detailed. Rewrite the user's question to be specific and search-friendly, expanding acronyms and \
technical terms. Return ONLY the rewritten query without any additional text or explanations.";

const INTENT_PROMPT: &str = "You are an expert at determining when a query requires up-to-date \
information from the internet. If an assistant without internet access could not answer it well \
(current events, recent statistics, real-time data, specific factual lookups, frequently changing \
information) return {\"requires_search\": true}. For general knowledge, coding help and similar \
questions return {\"requires_search\": false}. Return ONLY the JSON object.";

const GROUNDED_PROMPT: &str = "You are an intelligent teaching assistant specializing in accurate \
answers. When given context from documents, focus on that information and cite specific details. \
When given web search results, say that the information comes from a web search, synthesize it \
clearly and reference the source links. Always keep high accuracy and clarity.";

const BASELINE_PROMPT: &str = "You are a helpful teaching assistant. Answer the question from your \
own knowledge. Be clear and accurate.";

const TITLE_PROMPT: &str = "You are an expert at creating short, concise titles. Return ONLY a \
descriptive title of 4-5 words for the user's query, without quotes or explanations.";

/// A retrieved passage from one of the session's documents.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextPassage {
    pub source_name: String,
    pub text: String,
}

/// Everything the tools found for one question.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundingContext {
    pub passages: Vec<ContextPassage>,
    pub web_results: Vec<SearchHit>,
}

impl GroundingContext {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.passages.is_empty() && self.web_results.is_empty()
    }

    fn render(&self) -> String {
        let mut out = String::new();
        if !self.passages.is_empty() {
            out.push_str("Context from documents:\n");
            for passage in &self.passages {
                out.push_str(&format!("[{}]\n{}\n\n", passage.source_name, passage.text));
            }
        }
        if !self.web_results.is_empty() {
            out.push_str("Web search results:\n");
            for hit in &self.web_results {
                out.push_str(&format!("- {} ({})\n  {}\n", hit.title, hit.url, hit.snippet));
            }
        }
        out
    }
}

fn conversation(system: &str, history: &[Turn], last: String) -> Vec<Message> {
    let mut messages = vec![Message::system(system)];
    let skip = history.len().saturating_sub(HISTORY_WINDOW);
    for turn in history.iter().skip(skip) {
        messages.push(match turn.role {
            edumate_core::Role::User => Message::user(turn.content.as_str()),
            edumate_core::Role::Assistant => Message::assistant(turn.content.as_str()),
        });
    }
    messages.push(Message::user(last));
    messages
}

impl Assistant {
    /// Reformulate a question for retrieval. An empty rewrite yields the original.
    pub async fn rewrite_query(&self, query: &str) -> Result<String, LlmError> {
        let rewritten = self
            .ask_text(vec![Message::system(REWRITE_PROMPT), Message::user(query)])
            .await?;
        if rewritten.is_empty() { Ok(query.to_owned()) } else { Ok(rewritten) }
    }

    /// Whether the question needs fresh information from the web.
    pub async fn needs_web_search(&self, query: &str) -> Result<bool, LlmError> {
        let intent: IntentJson = self
            .ask_json(
                "search intent",
                vec![Message::system(INTENT_PROMPT), Message::user(format!("User query: {query}"))],
            )
            .await?;
        Ok(intent.requires_search)
    }

    /// Answer using the retrieved context.
    pub async fn answer_with_context(
        &self,
        query: &str,
        history: &[Turn],
        context: &GroundingContext,
    ) -> Result<String, LlmError> {
        let prompt = if context.is_empty() {
            query.to_owned()
        } else {
            format!("{}\nQuestion: {query}", context.render())
        };
        let reply = self.ask_text(conversation(GROUNDED_PROMPT, history, prompt)).await?;
        non_empty(reply)
    }

    /// Answer without any retrieved context, for side-by-side comparison.
    pub async fn baseline_answer(&self, query: &str, history: &[Turn]) -> Result<String, LlmError> {
        let reply = self.ask_text(conversation(BASELINE_PROMPT, history, query.to_owned())).await?;
        non_empty(reply)
    }

    /// A 4-5 word session title. Falls back to the default name on a blank reply.
    pub async fn session_title(&self, query: &str) -> Result<String, LlmError> {
        let reply = self
            .ask_text(vec![
                Message::system(TITLE_PROMPT),
                Message::user(format!("Generate a concise 4-5 word title for this query: {query}")),
            ])
            .await?;
        let title = reply.lines().next().unwrap_or("").trim().trim_matches(['"', '\'', '*', '#']).trim();
        if title.is_empty() {
            return Ok(DEFAULT_SESSION_NAME.to_owned());
        }
        Ok(shorten(title, MAX_TITLE_CHARS))
    }
}

fn non_empty(reply: String) -> Result<String, LlmError> {
    if reply.is_empty() { Err(LlmError::EmptyResponse) } else { Ok(reply) }
}
