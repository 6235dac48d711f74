use std::sync::Arc;
use std::time::Duration;

use edumate_core::{NewDocument, Session, Source, distinct_names};
use edumate_ingest::{Extracted, Extractor};
use edumate_storage::Storage;
use edumate_storage::traits::{DocumentStore, SessionStore};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::deadline::bounded;
use crate::error::ServiceError;
use crate::locks::KeyedLocks;

/// Result of one successful ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub session_id: String,
    pub source: Source,
    /// Distinct source names now recorded for the session.
    pub processed_documents: Vec<String>,
}

pub struct IngestionService {
    storage: Arc<Storage>,
    extractor: Extractor,
    locks: KeyedLocks,
    timeout: Duration,
}

impl IngestionService {
    #[must_use]
    pub const fn new(
        storage: Arc<Storage>,
        extractor: Extractor,
        locks: KeyedLocks,
        timeout: Duration,
    ) -> Self {
        Self { storage, extractor, locks, timeout }
    }

    /// Validate, extract and attach an uploaded file.
    ///
    /// Without a session id a new session named after the file is created
    /// together with the document, so a failed attach leaves no session behind.
    pub async fn ingest_file(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
        session_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<IngestOutcome, ServiceError> {
        bounded("document ingestion", self.timeout, cancel, async {
            self.check_session(session_id).await?;
            let extracted = self.extractor.extract_file(file_name, content_type, bytes).await?;
            self.store(session_id, extracted).await
        })
        .await
    }

    /// Fetch, extract and attach a web page or remote document.
    pub async fn ingest_url(
        &self,
        url: &str,
        session_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<IngestOutcome, ServiceError> {
        bounded("url ingestion", self.timeout, cancel, async {
            self.check_session(session_id).await?;
            let extracted = self.extractor.extract_url(url).await?;
            self.store(session_id, extracted).await
        })
        .await
    }

    /// Fetch and extract a URL without attaching it anywhere.
    pub(crate) async fn fetch_document(&self, url: &str) -> Result<NewDocument, ServiceError> {
        Ok(self.extractor.extract_url(url).await?.into_document())
    }

    async fn check_session(&self, session_id: Option<&str>) -> Result<(), ServiceError> {
        match session_id {
            Some(id) if !self.storage.session_exists(id).await? => Err(ServiceError::not_found("session", id)),
            _ => Ok(()),
        }
    }

    async fn store(&self, session_id: Option<&str>, extracted: Extracted) -> Result<IngestOutcome, ServiceError> {
        let document = extracted.into_document();
        let session_id = match session_id {
            Some(id) => {
                let _guard = self.locks.lock(id).await;
                self.storage.attach_document(id, &document).await?;
                id.to_owned()
            },
            None => {
                let session =
                    Session::new(uuid::Uuid::new_v4().to_string(), Some(document.source.name().to_owned()));
                self.storage.create_session_with_document(&session, &document).await?;
                session.id
            },
        };
        let sources = self.storage.session_sources(&session_id).await?;
        info!(
            session_id = %session_id,
            source = document.source.name(),
            kind = document.source.kind(),
            chunks = document.chunks.len(),
            "Document attached"
        );
        Ok(IngestOutcome {
            session_id,
            source: document.source,
            processed_documents: distinct_names(&sources),
        })
    }
}
