//! LLM client for EduMate
//!
//! OpenAI-compatible chat completions with retry, the prompt builders used by
//! chat, grading and curriculum generation, and a web search client.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

pub mod ai_types;
mod assistant;
mod chat;
mod client;
mod curriculum;
mod error;
mod grading;
mod model;
mod search;
mod vision;

#[cfg(test)]
mod search_tests;

pub use ai_types::{ContentPart, ImageUrl, Message, MessageContent};
pub use assistant::Assistant;
pub use chat::{ContextPassage, GroundingContext};
pub use client::{DEFAULT_MODEL, LlmClient, truncate};
pub use error::LlmError;
pub use model::{ChatModel, ReplyFormat};
pub use search::{DisabledSearch, SearchHit, SearxSearch, WebSearch};
