use async_trait::async_trait;
use edumate_core::{DocumentChunk, NewDocument, Session, Source};
use rusqlite::{Connection, TransactionBehavior, params};

use super::sessions::{ensure_session, insert_session, touch};
use super::{Storage, now_rfc3339, parse_json};
use crate::error::StorageError;
use crate::traits::DocumentStore;

/// Sources recorded for a session, in ingestion order.
pub(super) fn load_sources(conn: &Connection, session_id: &str) -> Result<Vec<Source>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT source_json FROM session_sources WHERE session_id = ?1 ORDER BY position",
    )?;
    let sources = stmt
        .query_map(params![session_id], |row| parse_json::<Source>(&row.get::<_, String>(0)?))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(sources)
}

/// Record a source and its chunks at the next free position. Caller owns
/// the transaction.
pub(super) fn insert_document(
    conn: &Connection,
    session_id: &str,
    document: &NewDocument,
    now: &str,
) -> Result<usize, StorageError> {
    let source_json = serde_json::to_string(&document.source)?;
    let position: i64 = conn.query_row(
        "SELECT COALESCE(MAX(position) + 1, 0) FROM session_sources WHERE session_id = ?1",
        params![session_id],
        |row| row.get(0),
    )?;
    conn.execute(
        "INSERT INTO session_sources (session_id, position, name, source_json, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
        params![session_id, position, document.source.name(), source_json, now],
    )?;
    let mut stmt = conn.prepare(
        "INSERT INTO source_chunks (session_id, source_position, chunk_index, content)
           VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (index, chunk) in document.chunks.iter().enumerate() {
        stmt.execute(params![session_id, position, index as i64, chunk])?;
    }
    Ok(position as usize)
}

fn attach(conn: &mut Connection, session_id: &str, document: &NewDocument) -> Result<usize, StorageError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    ensure_session(&tx, session_id)?;
    let now = now_rfc3339();
    let position = insert_document(&tx, session_id, document, &now)?;
    touch(&tx, session_id, &now)?;
    tx.commit()?;
    Ok(position)
}

fn create_with_document(
    conn: &mut Connection,
    session: &Session,
    document: &NewDocument,
) -> Result<usize, StorageError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    insert_session(&tx, session)?;
    let position = insert_document(&tx, &session.id, document, &now_rfc3339())?;
    tx.commit()?;
    Ok(position)
}

fn load_chunks(conn: &Connection, session_id: &str) -> Result<Vec<DocumentChunk>, StorageError> {
    ensure_session(conn, session_id)?;
    let mut stmt = conn.prepare(
        "SELECT c.source_position, s.source_json, c.chunk_index, c.content
           FROM source_chunks c
           JOIN session_sources s
             ON s.session_id = c.session_id AND s.position = c.source_position
          WHERE c.session_id = ?1
          ORDER BY c.source_position, c.chunk_index",
    )?;
    let chunks = stmt
        .query_map(params![session_id], |row| {
            Ok(DocumentChunk {
                source_position: row.get::<_, i64>(0)? as usize,
                source: parse_json(&row.get::<_, String>(1)?)?,
                chunk_index: row.get::<_, i64>(2)? as usize,
                content: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(chunks)
}

#[async_trait]
impl DocumentStore for Storage {
    async fn attach_document(&self, session_id: &str, document: &NewDocument) -> Result<usize, StorageError> {
        let session_id = session_id.to_owned();
        let document = document.clone();
        self.run(move |conn| attach(conn, &session_id, &document)).await
    }

    async fn create_session_with_document(
        &self,
        session: &Session,
        document: &NewDocument,
    ) -> Result<usize, StorageError> {
        let session = session.clone();
        let document = document.clone();
        self.run(move |conn| create_with_document(conn, &session, &document)).await
    }

    async fn session_sources(&self, session_id: &str) -> Result<Vec<Source>, StorageError> {
        let session_id = session_id.to_owned();
        self.run(move |conn| {
            ensure_session(conn, &session_id)?;
            load_sources(conn, &session_id)
        })
        .await
    }

    async fn document_chunks(&self, session_id: &str) -> Result<Vec<DocumentChunk>, StorageError> {
        let session_id = session_id.to_owned();
        self.run(move |conn| load_chunks(conn, &session_id)).await
    }
}
