use aws_sdk_s3::Client;
use aws_smithy_types::byte_stream::ByteStream;
use uuid::Uuid;

use anamnesis_core::keys;
use anamnesis_core::models::session::Session;

use crate::error::StorageError;
use crate::store::{BoxFuture, SessionStore, sort_oldest_first};

/// One JSON object per session under `sessions/` in an S3 bucket.
pub struct S3SessionStore {
    client: Client,
    bucket: String,
}

impl S3SessionStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    async fn put_snapshot(&self, session: &Session) -> Result<(), StorageError> {
        let key = keys::session(session.id);
        let body = serde_json::to_vec_pretty(session)?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type("application/json")
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StorageError::PutObject(e.into_service_error().to_string()))?;

        tracing::debug!(bucket = %self.bucket, key = %key, "session snapshot uploaded");
        Ok(())
    }

    async fn get_snapshot(&self, id: Uuid) -> Result<Option<Session>, StorageError> {
        let key = keys::session(id);
        let resp = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                let err = e.into_service_error();
                if err.is_no_such_key() {
                    return Ok(None);
                }
                return Err(StorageError::GetObject(err.to_string()));
            }
        };

        let body = resp
            .body
            .collect()
            .await
            .map_err(|e| StorageError::GetObject(e.to_string()))?
            .into_bytes();

        Ok(Some(serde_json::from_slice(&body)?))
    }

    async fn delete_snapshot(&self, id: Uuid) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(keys::session(id))
            .send()
            .await
            .map_err(|e| StorageError::DeleteObject(e.into_service_error().to_string()))?;
        Ok(())
    }

    async fn list_session_ids(&self) -> Result<Vec<Uuid>, StorageError> {
        let mut ids = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut req = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(keys::SESSIONS_PREFIX);

            if let Some(token) = &continuation_token {
                req = req.continuation_token(token);
            }

            let resp = req
                .send()
                .await
                .map_err(|e| StorageError::ListObjects(e.into_service_error().to_string()))?;

            ids.extend(
                resp.contents()
                    .iter()
                    .filter_map(|obj| obj.key())
                    .filter_map(keys::session_id_from_key),
            );

            if resp.is_truncated() == Some(true) {
                continuation_token = resp.next_continuation_token().map(|s| s.to_string());
            } else {
                break;
            }
        }

        Ok(ids)
    }

    async fn load_all(&self) -> Result<Vec<Session>, StorageError> {
        let mut sessions = Vec::new();
        for id in self.list_session_ids().await? {
            // Deleted between list and get: skip.
            if let Some(session) = self.get_snapshot(id).await? {
                sessions.push(session);
            }
        }
        sort_oldest_first(&mut sessions);
        Ok(sessions)
    }
}

impl SessionStore for S3SessionStore {
    fn save<'a>(&'a self, session: &'a Session) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(self.put_snapshot(session))
    }

    fn get_by_id(&self, id: Uuid) -> BoxFuture<'_, Result<Option<Session>, StorageError>> {
        Box::pin(self.get_snapshot(id))
    }

    fn delete(&self, id: Uuid) -> BoxFuture<'_, Result<(), StorageError>> {
        Box::pin(self.delete_snapshot(id))
    }

    fn list_all(&self) -> BoxFuture<'_, Result<Vec<Session>, StorageError>> {
        Box::pin(self.load_all())
    }
}
