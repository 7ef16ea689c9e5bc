//! Debounced persistence of session snapshots.
//!
//! A background task owns the pending snapshot. Bursts of `schedule` calls
//! collapse into one write once the session has been quiet for the debounce
//! period, or once `max_wait` has passed since the first unsaved snapshot.
//! Commands are handled in order, so a `discard` issued after a write has
//! started is applied after that write lands.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::models::AssessmentId;
use crate::session::Snapshot;
use crate::storage::{SessionStore, StorageError};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1500);
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveConfig {
    pub debounce: Duration,
    pub max_wait: Duration,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            max_wait: DEFAULT_MAX_WAIT,
        }
    }
}

/// Outcome of a background write.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveEvent {
    Saved {
        assessment_id: AssessmentId,
        revision: u64,
        saved_at: DateTime<Utc>,
    },
    Failed {
        assessment_id: AssessmentId,
        revision: u64,
        reason: String,
    },
}

enum Command {
    Schedule(Snapshot),
    Cancel,
    SaveNow(Snapshot, oneshot::Sender<Result<(), StorageError>>),
    Discard(AssessmentId, oneshot::Sender<Result<(), StorageError>>),
}

/// Handle to the autosave task. Dropping it stops the task and forgets any
/// pending snapshot; a write already under way still completes.
pub struct Autosaver {
    commands: mpsc::UnboundedSender<Command>,
    _task: JoinHandle<()>,
}

impl Autosaver {
    pub fn spawn(
        store: Arc<dyn SessionStore>,
        config: AutosaveConfig,
        events: mpsc::UnboundedSender<SaveEvent>,
    ) -> Self {
        let (commands, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(store, config, receiver, events));
        Self {
            commands,
            _task: task,
        }
    }

    /// Queues a snapshot, replacing any pending one.
    pub fn schedule(&self, snapshot: Snapshot) {
        let _ = self.commands.send(Command::Schedule(snapshot));
    }

    /// Forgets the pending snapshot.
    pub fn cancel(&self) {
        let _ = self.commands.send(Command::Cancel);
    }

    /// Writes `snapshot` right away, superseding anything pending.
    pub async fn save_now(&self, snapshot: Snapshot) -> Result<(), StorageError> {
        let (reply, response) = oneshot::channel();
        self.request(Command::SaveNow(snapshot, reply), response)
            .await
    }

    /// Forgets the pending snapshot and deletes the stored session.
    pub async fn discard(&self, id: AssessmentId) -> Result<(), StorageError> {
        let (reply, response) = oneshot::channel();
        self.request(Command::Discard(id, reply), response).await
    }

    async fn request(
        &self,
        command: Command,
        response: oneshot::Receiver<Result<(), StorageError>>,
    ) -> Result<(), StorageError> {
        self.commands
            .send(command)
            .map_err(|_| StorageError::Unavailable("autosave task stopped".to_string()))?;
        response
            .await
            .map_err(|_| StorageError::Unavailable("autosave task stopped".to_string()))?
    }
}

async fn run(
    store: Arc<dyn SessionStore>,
    config: AutosaveConfig,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<SaveEvent>,
) {
    let mut pending: Option<Snapshot> = None;
    let mut first_pending_at: Option<Instant> = None;
    let mut deadline = Instant::now();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                None => break,
                Some(Command::Schedule(snapshot)) => {
                    let now = Instant::now();
                    let first = *first_pending_at.get_or_insert(now);
                    deadline = (now + config.debounce).min(first + config.max_wait);
                    pending = Some(snapshot);
                }
                Some(Command::Cancel) => {
                    pending = None;
                    first_pending_at = None;
                }
                Some(Command::SaveNow(snapshot, reply)) => {
                    pending = None;
                    first_pending_at = None;
                    let result = write(&store, snapshot, &events).await;
                    let _ = reply.send(result);
                }
                Some(Command::Discard(id, reply)) => {
                    pending = None;
                    first_pending_at = None;
                    let result = remove(&store, id).await;
                    let _ = reply.send(result);
                }
            },
            () = tokio::time::sleep_until(deadline), if pending.is_some() => {
                first_pending_at = None;
                if let Some(snapshot) = pending.take() {
                    let _ = write(&store, snapshot, &events).await;
                }
            }
        }
    }

    if pending.is_some() {
        tracing::debug!("autosave stopped with a pending snapshot");
    }
}

async fn write(
    store: &Arc<dyn SessionStore>,
    snapshot: Snapshot,
    events: &mpsc::UnboundedSender<SaveEvent>,
) -> Result<(), StorageError> {
    let Snapshot { revision, state } = snapshot;
    let assessment_id = state.assessment_id;
    let saved_at = state.saved_at;

    let store = Arc::clone(store);
    let result = tokio::task::spawn_blocking(move || store.save(&state))
        .await
        .unwrap_or_else(|e| Err(StorageError::Unavailable(e.to_string())));

    let event = match &result {
        Ok(()) => {
            tracing::debug!("autosaved assessment {assessment_id} at revision {revision}");
            SaveEvent::Saved {
                assessment_id,
                revision,
                saved_at,
            }
        }
        Err(e) => {
            tracing::error!("autosave of assessment {assessment_id} failed: {e}");
            SaveEvent::Failed {
                assessment_id,
                revision,
                reason: e.to_string(),
            }
        }
    };
    let _ = events.send(event);

    result
}

async fn remove(store: &Arc<dyn SessionStore>, id: AssessmentId) -> Result<(), StorageError> {
    let store = Arc::clone(store);
    let result = tokio::task::spawn_blocking(move || store.remove(id))
        .await
        .unwrap_or_else(|e| Err(StorageError::Unavailable(e.to_string())));

    match &result {
        Ok(()) => tracing::info!("removed stored session for assessment {id}"),
        Err(e) => tracing::error!("failed to remove stored session for assessment {id}: {e}"),
    }
    result
}
