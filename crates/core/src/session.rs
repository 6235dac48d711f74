use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SESSION_NAME;
use crate::source::{NewDocument, Source};

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// One message in a session's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Key under which the baseline reply for the user turn at `position` is stored.
#[must_use]
pub fn turn_key(position: usize) -> String {
    format!("user_msg_{position}")
}

/// Full chat session state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub name: String,
    pub history: Vec<Turn>,
    /// Every successful ingestion, in order. Duplicates are kept.
    pub sources: Vec<Source>,
    pub baseline_responses: BTreeMap<String, String>,
    pub use_web_search: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub fn new(id: String, name: Option<String>) -> Self {
        let now = Utc::now();
        let name = name
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_SESSION_NAME.to_owned());
        Self {
            id,
            name,
            history: Vec::new(),
            sources: Vec::new(),
            baseline_responses: BTreeMap::new(),
            use_web_search: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Distinct source names in first-ingestion order.
    #[must_use]
    pub fn processed_documents(&self) -> Vec<String> {
        distinct_names(&self.sources)
    }

    #[must_use]
    pub fn has_default_name(&self) -> bool {
        self.name == DEFAULT_SESSION_NAME
    }
}

/// Distinct source names in first-seen order.
#[must_use]
pub fn distinct_names(sources: &[Source]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for source in sources {
        if !names.iter().any(|n| n == source.name()) {
            names.push(source.name().to_owned());
        }
    }
    names
}

/// Listing entry for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything one answered chat message writes to its session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewExchange {
    pub user_content: String,
    pub assistant_content: String,
    pub baseline: Option<String>,
    /// Documents fetched from URLs in the user message.
    pub documents: Vec<NewDocument>,
}

/// Result of committing a completed chat exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommittedExchange {
    pub user_position: usize,
    pub assistant_position: usize,
}
