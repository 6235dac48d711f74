use std::sync::Arc;

use edumate_core::{Session, SessionInfo, Source};
use edumate_storage::Storage;
use edumate_storage::traits::{DocumentStore, SessionStore};

use crate::error::ServiceError;

pub struct SessionService {
    storage: Arc<Storage>,
}

impl SessionService {
    #[must_use]
    pub const fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    /// Create a session. A missing or blank name becomes the default name.
    pub async fn create(&self, name: Option<String>) -> Result<Session, ServiceError> {
        let session = Session::new(uuid::Uuid::new_v4().to_string(), name);
        self.storage.create_session(&session).await?;
        tracing::info!(session_id = %session.id, name = %session.name, "Session created");
        Ok(session)
    }

    pub async fn get(&self, id: &str) -> Result<Session, ServiceError> {
        self.storage.get_session(id).await?.ok_or_else(|| ServiceError::not_found("session", id))
    }

    pub async fn list(&self) -> Result<Vec<SessionInfo>, ServiceError> {
        Ok(self.storage.list_sessions().await?)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        if self.storage.delete_session(id).await? {
            tracing::info!(session_id = %id, "Session deleted");
            Ok(())
        } else {
            Err(ServiceError::not_found("session", id))
        }
    }

    pub async fn rename(&self, id: &str, name: &str) -> Result<(), ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(edumate_core::ValidationError::Empty { field: "session_name" }.into());
        }
        Ok(self.storage.rename_session(id, name).await?)
    }

    /// Every source recorded for the session, duplicates included.
    pub async fn sources(&self, id: &str) -> Result<Vec<Source>, ServiceError> {
        Ok(self.storage.session_sources(id).await?)
    }
}
