use std::future::Future;
use std::pin::Pin;

use uuid::Uuid;

use anamnesis_core::models::session::{Session, SessionPatch};

use crate::error::StorageError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Durable, id-keyed store of session snapshots.
///
/// There is no locking across callers: `update` is a read-modify-write and the
/// last writer wins. Methods return boxed futures for dyn compatibility.
pub trait SessionStore: Send + Sync {
    /// Insert or overwrite the snapshot for `session.id`.
    fn save<'a>(&'a self, session: &'a Session) -> BoxFuture<'a, Result<(), StorageError>>;

    fn get_by_id(&self, id: Uuid) -> BoxFuture<'_, Result<Option<Session>, StorageError>>;

    /// Merge `patch` into the stored snapshot and bump `updated_at`.
    ///
    /// Returns `Ok(false)` and logs a warning when no snapshot exists.
    fn update(
        &self,
        id: Uuid,
        patch: SessionPatch,
    ) -> BoxFuture<'_, Result<bool, StorageError>> {
        Box::pin(async move {
            let Some(mut session) = self.get_by_id(id).await? else {
                tracing::warn!(session_id = %id, "update skipped: no stored session");
                return Ok(false);
            };
            session.apply(patch);
            session.touch();
            self.save(&session).await?;
            Ok(true)
        })
    }

    /// Remove a snapshot. Deleting an absent id is not an error.
    fn delete(&self, id: Uuid) -> BoxFuture<'_, Result<(), StorageError>>;

    /// All snapshots, oldest first.
    fn list_all(&self) -> BoxFuture<'_, Result<Vec<Session>, StorageError>>;
}

pub(crate) fn sort_oldest_first(sessions: &mut [Session]) {
    sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}
