use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use edumate_core::constants::{DEFAULT_SESSION_NAME, RETRIEVAL_SUFFICIENT_SCORE, RETRIEVAL_TOP_K};
use edumate_core::text::{find_urls, relevance, tokenize};
use edumate_core::{DocumentChunk, NewDocument, NewExchange, Session, Source, ValidationError, turn_key};
use edumate_llm::{Assistant, ContextPassage, GroundingContext, SearchHit, WebSearch};
use edumate_storage::Storage;
use edumate_storage::traits::{DocumentStore, SessionStore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::deadline::bounded;
use crate::error::ServiceError;
use crate::ingestion_service::IngestionService;
use crate::locks::KeyedLocks;

const SEARCH_RESULTS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatRequest {
    pub content: String,
    pub session_id: Option<String>,
    pub force_web_search: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub content: String,
    pub sources: Vec<Source>,
    pub baseline_response: Option<String>,
    pub session_id: String,
    /// Key the baseline is stored under, `user_msg_{position}`.
    pub turn_key: String,
}

struct ScoredChunk {
    score: f64,
    chunk: DocumentChunk,
}

/// A committed exchange and whether the session still needs a title.
struct Answered {
    reply: ChatReply,
    untitled: bool,
}

pub struct ChatService {
    storage: Arc<Storage>,
    assistant: Assistant,
    search: Arc<dyn WebSearch>,
    ingestion: Arc<IngestionService>,
    locks: KeyedLocks,
    timeout: Duration,
}

impl ChatService {
    #[must_use]
    pub fn new(
        storage: Arc<Storage>,
        assistant: Assistant,
        search: Arc<dyn WebSearch>,
        ingestion: Arc<IngestionService>,
        locks: KeyedLocks,
        timeout: Duration,
    ) -> Self {
        Self { storage, assistant, search, ingestion, locks, timeout }
    }

    /// Answer one user message.
    ///
    /// Turns, baseline and any documents fetched from URLs in the message are
    /// written once both replies exist, in a single transaction, so a failed,
    /// timed-out or cancelled request leaves the session untouched. Messages
    /// to the same session are handled one at a time; waiting for the session
    /// counts against the request's deadline.
    pub async fn respond(&self, request: ChatRequest, cancel: &CancellationToken) -> Result<ChatReply, ServiceError> {
        let content = request.content.trim().to_owned();
        if content.is_empty() {
            return Err(ValidationError::Empty { field: "content" }.into());
        }
        let session_id = match request.session_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(id) => {
                if !self.storage.session_exists(id).await? {
                    return Err(ServiceError::not_found("session", id));
                }
                id.to_owned()
            },
            None => {
                let session = Session::new(uuid::Uuid::new_v4().to_string(), None);
                self.storage.create_session(&session).await?;
                session.id
            },
        };

        let answered = bounded("chat", self.timeout, cancel, async {
            let _guard = self.locks.lock(&session_id).await;
            self.exchange(&session_id, &content, request.force_web_search).await
        })
        .await?;

        if answered.untitled {
            self.name_session(&session_id, &content, cancel).await;
        }
        Ok(answered.reply)
    }

    /// Everything up to and including the commit. Nothing is written before
    /// the final `commit_exchange`.
    async fn exchange(&self, session_id: &str, content: &str, force_web_search: bool) -> Result<Answered, ServiceError> {
        let session = self
            .storage
            .get_session(session_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("session", session_id))?;

        let mut fetched: Vec<NewDocument> = Vec::new();
        for url in find_urls(content) {
            let known = session.sources.iter().chain(fetched.iter().map(|d| &d.source)).any(|s| s.url() == Some(url.as_str()));
            if known {
                continue;
            }
            match self.ingestion.fetch_document(&url).await {
                Ok(document) => fetched.push(document),
                Err(e) => warn!(session_id, url = %url, error = %e, "Skipping URL from message"),
            }
        }

        let query = match self.assistant.rewrite_query(content).await {
            Ok(q) => q,
            Err(e) => {
                warn!(session_id, error = %e, "Query rewrite failed, using original text");
                content.to_owned()
            },
        };

        let (retrieved, sufficient) = if force_web_search {
            (Vec::new(), false)
        } else {
            let mut chunks = self.storage.document_chunks(session_id).await?;
            chunks.extend(pending_chunks(session.sources.len(), &fetched));
            retrieve(chunks, content, &query)
        };

        let web_results = if force_web_search {
            self.search.search(&query, SEARCH_RESULTS).await.map_err(|e| ServiceError::Upstream {
                service: "search",
                retryable: e.is_retryable(),
                message: e.to_string(),
            })?
        } else if !sufficient && session.use_web_search && self.wants_search(session_id, &query).await {
            self.search.search(&query, SEARCH_RESULTS).await.unwrap_or_else(|e| {
                warn!(session_id, error = %e, "Web search failed, answering without it");
                Vec::new()
            })
        } else {
            Vec::new()
        };
        debug!(session_id, documents = retrieved.len(), sufficient, web = web_results.len(), "Context gathered");

        let context = GroundingContext {
            passages: retrieved
                .iter()
                .map(|s| ContextPassage { source_name: s.chunk.source.name().to_owned(), text: s.chunk.content.clone() })
                .collect(),
            web_results,
        };
        let reply = self.assistant.answer_with_context(content, &session.history, &context).await?;
        let baseline = if context.is_empty() {
            None
        } else {
            match self.assistant.baseline_answer(content, &session.history).await {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!(session_id, error = %e, "Baseline generation failed");
                    None
                },
            }
        };

        let exchange = NewExchange {
            user_content: content.to_owned(),
            assistant_content: reply,
            baseline,
            documents: fetched,
        };
        let committed = self.storage.commit_exchange(session_id, &exchange).await?;
        info!(
            session_id,
            user_position = committed.user_position,
            baseline = exchange.baseline.is_some(),
            documents = exchange.documents.len(),
            "Exchange committed"
        );

        Ok(Answered {
            reply: ChatReply {
                content: exchange.assistant_content,
                sources: cited_sources(&retrieved, &context.web_results),
                baseline_response: exchange.baseline,
                session_id: session_id.to_owned(),
                turn_key: turn_key(committed.user_position),
            },
            untitled: session.has_default_name(),
        })
    }

    /// Give a default-named session a generated title. Runs after the
    /// exchange is committed; any failure, timeout or cancellation here only
    /// leaves the default name in place.
    async fn name_session(&self, session_id: &str, content: &str, cancel: &CancellationToken) {
        let titled = bounded("session title", self.timeout, cancel, async {
            let title = self.assistant.session_title(content).await?;
            if title != DEFAULT_SESSION_NAME {
                self.storage.rename_session(session_id, &title).await?;
            }
            Ok(())
        })
        .await;
        if let Err(e) = titled {
            warn!(session_id, error = %e, "Session keeps its default name");
        }
    }

    async fn wants_search(&self, session_id: &str, query: &str) -> bool {
        self.assistant.needs_web_search(query).await.unwrap_or_else(|e| {
            warn!(session_id, error = %e, "Intent detection failed, skipping web search");
            false
        })
    }
}

/// Chunks of documents fetched for this message, positioned after the
/// `stored` sources the session already has.
fn pending_chunks(stored: usize, fetched: &[NewDocument]) -> Vec<DocumentChunk> {
    fetched
        .iter()
        .enumerate()
        .flat_map(|(offset, document)| {
            document.chunks.iter().enumerate().map(move |(chunk_index, content)| DocumentChunk {
                source_position: stored + offset,
                source: document.source.clone(),
                chunk_index,
                content: content.clone(),
            })
        })
        .collect()
}

/// Best-scoring chunks and whether they are good enough to answer from.
///
/// When no chunk shares a term with the question ("summarize this"), the
/// opening chunks of the most recently added source are used instead.
fn retrieve(chunks: Vec<DocumentChunk>, original: &str, rewritten: &str) -> (Vec<ScoredChunk>, bool) {
    let original_terms: HashSet<String> = tokenize(original).into_iter().collect();
    let rewritten_terms: HashSet<String> = tokenize(rewritten).into_iter().collect();
    let mut scored: Vec<ScoredChunk> = chunks
        .into_iter()
        .map(|chunk| {
            let score = relevance(&original_terms, &chunk.content).max(relevance(&rewritten_terms, &chunk.content));
            ScoredChunk { score, chunk }
        })
        .collect();

    if scored.iter().all(|s| s.score <= 0.0) {
        let Some(latest) = scored.iter().map(|s| s.chunk.source_position).max() else {
            return (Vec::new(), false);
        };
        scored.retain(|s| s.chunk.source_position == latest);
        scored.sort_by_key(|s| s.chunk.chunk_index);
        scored.truncate(RETRIEVAL_TOP_K);
        return (scored, false);
    }

    scored.retain(|s| s.score > 0.0);
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(RETRIEVAL_TOP_K);
    let sufficient = scored.first().is_some_and(|s| s.score >= RETRIEVAL_SUFFICIENT_SCORE);
    (scored, sufficient)
}

/// One entry per distinct document source, then one per web result.
fn cited_sources(retrieved: &[ScoredChunk], web: &[SearchHit]) -> Vec<Source> {
    let mut seen = HashSet::new();
    let mut sources: Vec<Source> = retrieved
        .iter()
        .filter(|s| seen.insert(s.chunk.source_position))
        .map(|s| s.chunk.source.clone())
        .collect();
    sources.extend(web.iter().map(|hit| {
        Source::web(hit.title.clone(), hit.url.clone()).with_excerpt_from(&hit.snippet)
    }));
    sources
}
