//! Durable storage for session state, keyed by assessment id.

mod file;
mod memory;

use thiserror::Error;

use crate::models::AssessmentId;
use crate::session::SessionState;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Storage key for an assessment's session.
pub fn storage_key(id: AssessmentId) -> String {
    format!("assessment_{id}")
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("stored session {key} is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Where session state lives between runs.
pub trait SessionStore: Send + Sync {
    fn load(&self, id: AssessmentId) -> Result<Option<SessionState>, StorageError>;

    fn save(&self, state: &SessionState) -> Result<(), StorageError>;

    /// Deletes the entry. Removing a missing entry is not an error.
    fn remove(&self, id: AssessmentId) -> Result<(), StorageError>;

    fn contains(&self, id: AssessmentId) -> Result<bool, StorageError> {
        Ok(self.load(id)?.is_some())
    }
}

fn decode(key: &str, json: &str) -> Result<SessionState, StorageError> {
    serde_json::from_str(json).map_err(|source| StorageError::Corrupt {
        key: key.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_prefixed_with_assessment() {
        assert_eq!(storage_key(101), "assessment_101");
    }
}
