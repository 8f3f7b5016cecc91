use std::path::{Path, PathBuf};

use uuid::Uuid;

use anamnesis_core::keys;
use anamnesis_core::models::session::Session;

use crate::error::StorageError;
use crate::store::{BoxFuture, SessionStore, sort_oldest_first};

/// One pretty-printed JSON file per session in a local directory.
///
/// Writes go to a temp file that is then renamed over the target, so a crash
/// never leaves a half-written snapshot.
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(keys::session_file_name(id))
    }

    fn write(&self, session: &Session) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(session.id);
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(session)?;
        std::fs::write(&tmp_path, &json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
        }

        std::fs::rename(&tmp_path, &path)?;
        tracing::debug!(path = %path.display(), "session snapshot written");
        Ok(())
    }

    fn read(&self, id: Uuid) -> Result<Option<Session>, StorageError> {
        let path = self.path_for(id);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remove(&self, id: Uuid) -> Result<(), StorageError> {
        let path = self.path_for(id);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "session snapshot deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn read_all(&self) -> Result<Vec<Session>, StorageError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut sessions = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let Some(id) = name.to_str().and_then(keys::session_id_from_key) else {
                continue;
            };
            if let Some(session) = self.read(id)? {
                sessions.push(session);
            }
        }
        sort_oldest_first(&mut sessions);
        Ok(sessions)
    }
}

impl SessionStore for FileSessionStore {
    fn save<'a>(&'a self, session: &'a Session) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move { self.write(session) })
    }

    fn get_by_id(&self, id: Uuid) -> BoxFuture<'_, Result<Option<Session>, StorageError>> {
        Box::pin(async move { self.read(id) })
    }

    fn delete(&self, id: Uuid) -> BoxFuture<'_, Result<(), StorageError>> {
        Box::pin(async move { self.remove(id) })
    }

    fn list_all(&self) -> BoxFuture<'_, Result<Vec<Session>, StorageError>> {
        Box::pin(async move { self.read_all() })
    }
}
