use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::models::AssessmentId;
use crate::session::SessionState;

use super::{SessionStore, StorageError, decode, storage_key};

/// Keeps serialized sessions in memory. Writes can be made to fail, which
/// stands in for a full or read-only store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Raw JSON stored under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn insert_raw(&self, key: impl Into<String>, json: impl Into<String>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), json.into());
    }
}

impl SessionStore for MemoryStore {
    fn load(&self, id: AssessmentId) -> Result<Option<SessionState>, StorageError> {
        let key = storage_key(id);
        self.raw(&key)
            .map(|json| decode(&key, &json))
            .transpose()
    }

    fn save(&self, state: &SessionState) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        let json = serde_json::to_string(state)?;
        self.insert_raw(storage_key(state.assessment_id), json);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, id: AssessmentId) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&storage_key(id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::Answers;

    fn state(id: AssessmentId) -> SessionState {
        SessionState {
            assessment_id: id,
            answers: Answers::new(),
            current_question_index: 0,
            elapsed_time: 3,
            question_order: vec![1, 2],
            saved_at: Utc::now(),
        }
    }

    #[test]
    fn test_round_trips_through_json() {
        let store = MemoryStore::new();
        store.save(&state(12)).unwrap();

        let raw = store.raw("assessment_12").unwrap();
        assert!(raw.contains("\"elapsedTime\":3"));
        assert_eq!(store.load(12).unwrap().unwrap().question_order, vec![1, 2]);
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_failing_writes_leave_store_untouched() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        assert!(matches!(
            store.save(&state(1)),
            Err(StorageError::Unavailable(_))
        ));
        assert!(!store.contains(1).unwrap());
    }
}
