use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use omm_booking::{BookingWizard, WizardDeps, WizardError};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};
use uuid::Uuid;

pub type SharedWizard = Arc<Mutex<BookingWizard>>;

type SessionKey = (String, Uuid);

struct Session {
    wizard: SharedWizard,
    last_touched: Instant,
}

/// Live wizards, one per (user, trip). Removing an entry drops the wizard,
/// which stops its availability poll and discards unsaved debounced edits.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionKey, Session>>>,
}

impl SessionRegistry {
    pub async fn get(&self, user_id: &str, trip_id: Uuid) -> Option<SharedWizard> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&(user_id.to_string(), trip_id))?;
        session.last_touched = Instant::now();
        Some(session.wizard.clone())
    }

    /// Return the user's wizard for this trip, mounting one if needed
    pub async fn open(
        &self,
        deps: &WizardDeps,
        user_id: &str,
        trip_id: Uuid,
    ) -> Result<SharedWizard, WizardError> {
        if let Some(existing) = self.get(user_id, trip_id).await {
            return Ok(existing);
        }

        // Mount outside the lock; a concurrent open for the same key keeps
        // whichever wizard landed first.
        let wizard = BookingWizard::mount(deps, trip_id, user_id).await?;
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry((user_id.to_string(), trip_id))
            .or_insert_with(|| {
                info!(user_id, %trip_id, "Booking wizard mounted");
                Session {
                    wizard: Arc::new(Mutex::new(wizard)),
                    last_touched: Instant::now(),
                }
            });
        session.last_touched = Instant::now();
        Ok(session.wizard.clone())
    }

    pub async fn close(&self, user_id: &str, trip_id: Uuid) -> bool {
        let removed = self
            .sessions
            .write()
            .await
            .remove(&(user_id.to_string(), trip_id));
        if removed.is_some() {
            info!(user_id, %trip_id, "Booking wizard unmounted");
        }
        removed.is_some()
    }

    /// Unmount every wizard untouched for at least `idle`
    pub async fn evict_idle(&self, idle: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|(user_id, trip_id), session| {
            let keep = now.duration_since(session.last_touched) < idle;
            if !keep {
                info!(user_id = %user_id, %trip_id, "Idle booking wizard unmounted");
            }
            keep
        });
        before - sessions.len()
    }

    /// Background sweep of idle wizards
    pub fn spawn_sweeper(&self, idle: Duration, every: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let evicted = registry.evict_idle(idle).await;
                if evicted > 0 {
                    debug!(evicted, "Session sweep finished");
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
