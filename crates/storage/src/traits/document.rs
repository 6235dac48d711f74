use async_trait::async_trait;
use edumate_core::{DocumentChunk, NewDocument, Session, Source};

use crate::error::StorageError;

/// Ingested sources and their extracted text.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Record one ingestion with its text chunks. Returns the source position.
    async fn attach_document(&self, session_id: &str, document: &NewDocument) -> Result<usize, StorageError>;

    /// Insert a new session holding one document, in a single transaction.
    async fn create_session_with_document(
        &self,
        session: &Session,
        document: &NewDocument,
    ) -> Result<usize, StorageError>;

    /// Every recorded source in ingestion order.
    async fn session_sources(&self, session_id: &str) -> Result<Vec<Source>, StorageError>;

    /// All stored chunks for the session, ordered by source then chunk index.
    async fn document_chunks(&self, session_id: &str) -> Result<Vec<DocumentChunk>, StorageError>;
}
