use std::collections::HashMap;

use tokio::sync::Mutex;
use uuid::Uuid;

use anamnesis_core::models::session::{Session, SessionPatch};

use crate::error::StorageError;
use crate::store::{BoxFuture, SessionStore, sort_oldest_first};

/// Process-local store. Used in tests and for ephemeral deployments.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<Uuid, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn save<'a>(&'a self, session: &'a Session) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            self.sessions
                .lock()
                .await
                .insert(session.id, session.clone());
            Ok(())
        })
    }

    fn get_by_id(&self, id: Uuid) -> BoxFuture<'_, Result<Option<Session>, StorageError>> {
        Box::pin(async move { Ok(self.sessions.lock().await.get(&id).cloned()) })
    }

    fn update(
        &self,
        id: Uuid,
        patch: SessionPatch,
    ) -> BoxFuture<'_, Result<bool, StorageError>> {
        Box::pin(async move {
            let mut sessions = self.sessions.lock().await;
            let Some(session) = sessions.get_mut(&id) else {
                tracing::warn!(session_id = %id, "update skipped: no stored session");
                return Ok(false);
            };
            session.apply(patch);
            session.touch();
            Ok(true)
        })
    }

    fn delete(&self, id: Uuid) -> BoxFuture<'_, Result<(), StorageError>> {
        Box::pin(async move {
            self.sessions.lock().await.remove(&id);
            Ok(())
        })
    }

    fn list_all(&self) -> BoxFuture<'_, Result<Vec<Session>, StorageError>> {
        Box::pin(async move {
            let mut sessions: Vec<Session> =
                self.sessions.lock().await.values().cloned().collect();
            sort_oldest_first(&mut sessions);
            Ok(sessions)
        })
    }
}
