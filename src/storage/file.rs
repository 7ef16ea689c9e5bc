use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::models::AssessmentId;
use crate::session::SessionState;

use super::{SessionStore, StorageError, decode, storage_key};

/// One JSON file per assessment inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// The directory is created on first write.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn io_error(key: &str, source: std::io::Error) -> StorageError {
        StorageError::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl SessionStore for FileStore {
    fn load(&self, id: AssessmentId) -> Result<Option<SessionState>, StorageError> {
        let key = storage_key(id);
        match fs::read_to_string(self.path_for(&key)) {
            Ok(json) => decode(&key, &json).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(&key, e)),
        }
    }

    fn save(&self, state: &SessionState) -> Result<(), StorageError> {
        let key = storage_key(state.assessment_id);
        let json = serde_json::to_string(state)?;

        fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(&key, e))?;

        // Write beside the target and rename so readers never see half a file.
        let path = self.path_for(&key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| Self::io_error(&key, e))?;
        fs::rename(&tmp, &path).map_err(|e| Self::io_error(&key, e))?;

        tracing::debug!("wrote {}", path.display());
        Ok(())
    }

    fn remove(&self, id: AssessmentId) -> Result<(), StorageError> {
        let key = storage_key(id);
        match fs::remove_file(self.path_for(&key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(&key, e)),
        }
    }

    fn contains(&self, id: AssessmentId) -> Result<bool, StorageError> {
        Ok(self.path_for(&storage_key(id)).is_file())
    }
}
