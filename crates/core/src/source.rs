use serde::{Deserialize, Serialize};

use crate::constants::SOURCE_EXCERPT_CHARS;
use crate::text::excerpt;

/// Where a piece of context came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Source {
    Web {
        name: String,
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none", rename = "content")]
        excerpt: Option<String>,
    },
    Document {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none", rename = "content")]
        excerpt: Option<String>,
    },
    Image {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none", rename = "content")]
        excerpt: Option<String>,
    },
}

impl Source {
    #[must_use]
    pub fn web(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Web { name: name.into(), url: url.into(), excerpt: None }
    }

    #[must_use]
    pub fn document(name: impl Into<String>) -> Self {
        Self::Document { name: name.into(), url: None, excerpt: None }
    }

    #[must_use]
    pub fn image(name: impl Into<String>) -> Self {
        Self::Image { name: name.into(), url: None, excerpt: None }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Web { name, .. } | Self::Document { name, .. } | Self::Image { name, .. } => name,
        }
    }

    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Web { url, .. } => Some(url),
            Self::Document { url, .. } | Self::Image { url, .. } => url.as_deref(),
        }
    }

    #[must_use]
    pub fn excerpt(&self) -> Option<&str> {
        match self {
            Self::Web { excerpt, .. } | Self::Document { excerpt, .. } | Self::Image { excerpt, .. } => {
                excerpt.as_deref()
            },
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Web { .. } => "web",
            Self::Document { .. } => "document",
            Self::Image { .. } => "image",
        }
    }

    /// Same source with its excerpt cut from `text`.
    #[must_use]
    pub fn with_excerpt_from(mut self, text: &str) -> Self {
        let cut = excerpt(text, SOURCE_EXCERPT_CHARS);
        let value = (!cut.is_empty()).then_some(cut);
        match &mut self {
            Self::Web { excerpt, .. } | Self::Document { excerpt, .. } | Self::Image { excerpt, .. } => {
                *excerpt = value;
            },
        }
        self
    }

    #[must_use]
    pub fn with_url(mut self, link: impl Into<String>) -> Self {
        let link = link.into();
        match &mut self {
            Self::Web { url, .. } => *url = link,
            Self::Document { url, .. } | Self::Image { url, .. } => *url = Some(link),
        }
        self
    }
}

/// A retrievable slice of an ingested source's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChunk {
    /// Position of the owning ingestion within the session's source list.
    pub source_position: usize,
    pub source: Source,
    pub chunk_index: usize,
    pub content: String,
}

/// A source and its text chunks, not yet attached to any session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    pub source: Source,
    pub chunks: Vec<String>,
}
