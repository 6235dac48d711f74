use async_trait::async_trait;
use edumate_core::{CommittedExchange, NewExchange, Role, Session, SessionInfo};

use crate::error::StorageError;

/// Session lifecycle and conversation history.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new session. Fails with `Duplicate` if the id exists.
    async fn create_session(&self, session: &Session) -> Result<(), StorageError>;

    /// Full session state, including history, sources and baselines.
    async fn get_session(&self, id: &str) -> Result<Option<Session>, StorageError>;

    async fn session_exists(&self, id: &str) -> Result<bool, StorageError>;

    /// All sessions, most recently updated first.
    async fn list_sessions(&self) -> Result<Vec<SessionInfo>, StorageError>;

    /// Delete session and everything attached to it. Returns `true` if a row was deleted.
    async fn delete_session(&self, id: &str) -> Result<bool, StorageError>;

    async fn rename_session(&self, id: &str, name: &str) -> Result<(), StorageError>;

    /// Append one turn and return its position in the history.
    async fn append_turn(&self, id: &str, role: Role, content: &str)
    -> Result<usize, StorageError>;

    /// Store or replace the baseline reply for a turn key.
    async fn set_baseline_response(
        &self,
        id: &str,
        turn_key: &str,
        text: &str,
    ) -> Result<(), StorageError>;

    /// Attach the exchange's documents, then append the user turn, the
    /// assistant reply and the optional baseline, all in one transaction.
    async fn commit_exchange(&self, id: &str, exchange: &NewExchange) -> Result<CommittedExchange, StorageError>;
}
