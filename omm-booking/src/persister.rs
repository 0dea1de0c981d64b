use std::sync::Arc;
use std::time::Duration;

use omm_core::{BoxError, Clock, KeyValueStore};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{BookingDraft, PersistedProgress};
use crate::steps::WizardMode;

/// Saved progress is scoped to one traveler and one trip
pub fn storage_key(user_id: &str, trip_id: Uuid) -> String {
    format!("booking-progress-{}-{}", user_id, trip_id)
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Progress storage failed: {0}")]
    Storage(BoxError),

    #[error("Saved progress is unreadable: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
struct PendingSave {
    step_index: usize,
    mode: WizardMode,
    draft: BookingDraft,
}

struct Shared {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    key: String,
    // Serializes storage writes against clears so a late debounced write
    // cannot resurrect a cleared record.
    io: Mutex<()>,
}

impl Shared {
    async fn write(&self, save: &PendingSave) -> Result<(), PersistError> {
        let record = PersistedProgress {
            step_index: save.step_index,
            mode: save.mode,
            draft: save.draft.clone(),
            timestamp: self.clock.now().timestamp_millis(),
        };
        let payload = serde_json::to_string(&record)?;
        self.store
            .set(&self.key, &payload)
            .await
            .map_err(PersistError::Storage)?;
        debug!(key = %self.key, step = save.step_index, "Booking progress saved");
        Ok(())
    }
}

/// Saves wizard progress for one trip. Edits are coalesced: a write happens
/// only after the debounce window passes with no further edit, and always
/// carries the latest draft.
pub struct ProgressPersister {
    shared: Arc<Shared>,
    ttl: chrono::Duration,
    pending: watch::Sender<Option<PendingSave>>,
    writer: JoinHandle<()>,
}

impl ProgressPersister {
    /// Must be called inside a tokio runtime; spawns the debounce writer.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        user_id: &str,
        trip_id: Uuid,
        debounce: Duration,
        ttl: chrono::Duration,
    ) -> Self {
        let shared = Arc::new(Shared {
            store,
            clock,
            key: storage_key(user_id, trip_id),
            io: Mutex::new(()),
        });
        let (pending, rx) = watch::channel(None);
        let writer = tokio::spawn(run_writer(shared.clone(), rx, debounce));

        Self {
            shared,
            ttl,
            pending,
            writer,
        }
    }

    pub fn key(&self) -> &str {
        &self.shared.key
    }

    /// Schedule a debounced save
    pub fn save(&self, step_index: usize, mode: WizardMode, draft: BookingDraft) {
        self.pending.send_replace(Some(PendingSave {
            step_index,
            mode,
            draft,
        }));
    }

    /// Write immediately, superseding any scheduled save
    pub async fn save_now(
        &self,
        step_index: usize,
        mode: WizardMode,
        draft: BookingDraft,
    ) -> Result<(), PersistError> {
        let _io = self.shared.io.lock().await;
        self.pending.send_replace(None);
        self.shared
            .write(&PendingSave {
                step_index,
                mode,
                draft,
            })
            .await
    }

    /// Read saved progress. Records older than the TTL are treated as absent
    /// but left in storage.
    pub async fn load(&self) -> Result<Option<PersistedProgress>, PersistError> {
        let raw = self
            .shared
            .store
            .get(&self.shared.key)
            .await
            .map_err(PersistError::Storage)?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        let progress: PersistedProgress = serde_json::from_str(&raw)?;
        let age_ms = self.shared.clock.now().timestamp_millis() - progress.timestamp;

        if age_ms < self.ttl.num_milliseconds() {
            Ok(Some(progress))
        } else {
            debug!(key = %self.shared.key, age_ms, "Ignoring expired booking progress");
            Ok(None)
        }
    }

    /// Delete saved progress and drop any scheduled save
    pub async fn clear(&self) -> Result<(), PersistError> {
        let _io = self.shared.io.lock().await;
        self.pending.send_replace(None);
        self.shared
            .store
            .delete(&self.shared.key)
            .await
            .map_err(PersistError::Storage)
    }
}

impl Drop for ProgressPersister {
    fn drop(&mut self) {
        self.writer.abort();
    }
}

async fn run_writer(
    shared: Arc<Shared>,
    mut rx: watch::Receiver<Option<PendingSave>>,
    debounce: Duration,
) {
    loop {
        if rx.changed().await.is_err() {
            return;
        }

        // Restart the window on every edit.
        loop {
            match tokio::time::timeout(debounce, rx.changed()).await {
                Ok(Ok(())) => continue,
                // Persister dropped: the pending edit is discarded.
                Ok(Err(_)) => return,
                Err(_) => break,
            }
        }

        let _io = shared.io.lock().await;
        let pending = rx.borrow_and_update().clone();
        if let Some(save) = pending {
            if let Err(e) = shared.write(&save).await {
                warn!(key = %shared.key, "Failed to save booking progress: {}", e);
            }
        }
    }
}
