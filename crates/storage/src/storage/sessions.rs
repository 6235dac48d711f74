use std::collections::BTreeMap;

use async_trait::async_trait;
use edumate_core::{CommittedExchange, NewExchange, Role, Session, SessionInfo, Turn, turn_key};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};

use super::documents::{insert_document, load_sources};
use super::{Storage, format_time, now_rfc3339, parse_time};
use crate::error::StorageError;
use crate::traits::SessionStore;

pub(super) fn not_found(id: &str) -> StorageError {
    StorageError::NotFound { entity: "session", id: id.to_owned() }
}

/// Fail with `NotFound` unless the session row exists.
pub(super) fn ensure_session(conn: &Connection, id: &str) -> Result<(), StorageError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sessions WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )?;
    if exists { Ok(()) } else { Err(not_found(id)) }
}

pub(super) fn touch(conn: &Connection, id: &str, now: &str) -> Result<(), StorageError> {
    conn.execute("UPDATE sessions SET updated_at = ?1 WHERE id = ?2", params![now, id])?;
    Ok(())
}

pub(super) fn insert_session(conn: &Connection, session: &Session) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO sessions (id, name, use_web_search, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            session.id,
            session.name,
            session.use_web_search,
            format_time(&session.created_at),
            format_time(&session.updated_at),
        ],
    )?;
    Ok(())
}

fn load_session(conn: &Connection, id: &str) -> Result<Option<Session>, StorageError> {
    let head = conn
        .query_row(
            "SELECT id, name, use_web_search, created_at, updated_at FROM sessions WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, bool>(2)?,
                    parse_time(&row.get::<_, String>(3)?)?,
                    parse_time(&row.get::<_, String>(4)?)?,
                ))
            },
        )
        .optional()?;
    let Some((id, name, use_web_search, created_at, updated_at)) = head else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT role, content FROM session_turns WHERE session_id = ?1 ORDER BY position",
    )?;
    let history = stmt
        .query_map(params![id], |row| {
            let role: String = row.get(0)?;
            let role = role.parse::<Role>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    e.into(),
                )
            })?;
            Ok(Turn { role, content: row.get(1)? })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn
        .prepare("SELECT turn_key, content FROM baseline_responses WHERE session_id = ?1")?;
    let baseline_responses = stmt
        .query_map(params![id], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<BTreeMap<_, _>, _>>()?;

    let sources = load_sources(conn, &id)?;

    Ok(Some(Session {
        id,
        name,
        history,
        sources,
        baseline_responses,
        use_web_search,
        created_at,
        updated_at,
    }))
}

fn list_sessions(conn: &Connection) -> Result<Vec<SessionInfo>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, created_at, updated_at FROM sessions ORDER BY updated_at DESC, id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(SessionInfo {
                id: row.get(0)?,
                name: row.get(1)?,
                created_at: parse_time(&row.get::<_, String>(2)?)?,
                updated_at: parse_time(&row.get::<_, String>(3)?)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Append a turn at the next free position. Caller owns the transaction.
fn push_turn(
    conn: &Connection,
    id: &str,
    role: Role,
    content: &str,
    now: &str,
) -> Result<usize, StorageError> {
    let position: i64 = conn.query_row(
        "SELECT COALESCE(MAX(position) + 1, 0) FROM session_turns WHERE session_id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    conn.execute(
        "INSERT INTO session_turns (session_id, position, role, content, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, position, role.as_str(), content, now],
    )?;
    Ok(position as usize)
}

fn append_turn(
    conn: &mut Connection,
    id: &str,
    role: Role,
    content: &str,
) -> Result<usize, StorageError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    ensure_session(&tx, id)?;
    let now = now_rfc3339();
    let position = push_turn(&tx, id, role, content, &now)?;
    touch(&tx, id, &now)?;
    tx.commit()?;
    Ok(position)
}

fn set_baseline(conn: &Connection, id: &str, key: &str, text: &str) -> Result<(), StorageError> {
    ensure_session(conn, id)?;
    conn.execute(
        "INSERT INTO baseline_responses (session_id, turn_key, content) VALUES (?1, ?2, ?3)
           ON CONFLICT(session_id, turn_key) DO UPDATE SET content = excluded.content",
        params![id, key, text],
    )?;
    Ok(())
}

fn commit_exchange(
    conn: &mut Connection,
    id: &str,
    exchange: &NewExchange,
) -> Result<CommittedExchange, StorageError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    ensure_session(&tx, id)?;
    let now = now_rfc3339();
    for document in &exchange.documents {
        insert_document(&tx, id, document, &now)?;
    }
    let user_position = push_turn(&tx, id, Role::User, &exchange.user_content, &now)?;
    let assistant_position = push_turn(&tx, id, Role::Assistant, &exchange.assistant_content, &now)?;
    if let Some(text) = &exchange.baseline {
        set_baseline(&tx, id, &turn_key(user_position), text)?;
    }
    touch(&tx, id, &now)?;
    tx.commit()?;
    Ok(CommittedExchange { user_position, assistant_position })
}

#[async_trait]
impl SessionStore for Storage {
    async fn create_session(&self, session: &Session) -> Result<(), StorageError> {
        let session = session.clone();
        self.run(move |conn| insert_session(conn, &session)).await
    }

    async fn get_session(&self, id: &str) -> Result<Option<Session>, StorageError> {
        let id = id.to_owned();
        self.run(move |conn| load_session(conn, &id)).await
    }

    async fn session_exists(&self, id: &str) -> Result<bool, StorageError> {
        let id = id.to_owned();
        self.run(move |conn| match ensure_session(conn, &id) {
            Ok(()) => Ok(true),
            Err(StorageError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        })
        .await
    }

    async fn list_sessions(&self) -> Result<Vec<SessionInfo>, StorageError> {
        self.run(|conn| list_sessions(conn)).await
    }

    async fn delete_session(&self, id: &str) -> Result<bool, StorageError> {
        let id = id.to_owned();
        self.run(move |conn| {
            let deleted = conn.execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn rename_session(&self, id: &str, name: &str) -> Result<(), StorageError> {
        let id = id.to_owned();
        let name = name.to_owned();
        self.run(move |conn| {
            let updated = conn.execute(
                "UPDATE sessions SET name = ?1, updated_at = ?2 WHERE id = ?3",
                params![name, now_rfc3339(), id],
            )?;
            if updated == 0 { Err(not_found(&id)) } else { Ok(()) }
        })
        .await
    }

    async fn append_turn(
        &self,
        id: &str,
        role: Role,
        content: &str,
    ) -> Result<usize, StorageError> {
        let id = id.to_owned();
        let content = content.to_owned();
        self.run(move |conn| append_turn(conn, &id, role, &content)).await
    }

    async fn set_baseline_response(
        &self,
        id: &str,
        turn_key: &str,
        text: &str,
    ) -> Result<(), StorageError> {
        let id = id.to_owned();
        let key = turn_key.to_owned();
        let text = text.to_owned();
        self.run(move |conn| set_baseline(conn, &id, &key, &text)).await
    }

    async fn commit_exchange(
        &self,
        id: &str,
        exchange: &NewExchange,
    ) -> Result<CommittedExchange, StorageError> {
        let id = id.to_owned();
        let exchange = exchange.clone();
        self.run(move |conn| commit_exchange(conn, &id, &exchange)).await
    }
}
