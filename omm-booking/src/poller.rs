use std::sync::Arc;
use std::time::Duration;

use omm_core::{BoxError, Clock, TripRepository};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::AvailabilitySnapshot;

/// Periodically re-reads a trip's capacity counters
pub struct AvailabilityPoller {
    trips: Arc<dyn TripRepository>,
    clock: Arc<dyn Clock>,
    trip_id: Uuid,
    interval: Duration,
}

impl AvailabilityPoller {
    pub fn new(
        trips: Arc<dyn TripRepository>,
        clock: Arc<dyn Clock>,
        trip_id: Uuid,
        interval: Duration,
    ) -> Self {
        Self {
            trips,
            clock,
            trip_id,
            interval,
        }
    }

    /// One capacity read. `Ok(None)` when the trip has no capacity row.
    pub async fn fetch(&self) -> Result<Option<AvailabilitySnapshot>, BoxError> {
        let capacity = self.trips.get_capacity(self.trip_id).await?;
        Ok(capacity.map(|c| AvailabilitySnapshot::from_capacity(&c, self.clock.now())))
    }

    /// Start polling: immediately, then once per interval until the handle is dropped.
    pub fn spawn(self) -> AvailabilityHandle {
        let (tx, rx) = watch::channel(None);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match self.fetch().await {
                    Ok(Some(snapshot)) => {
                        debug!(
                            trip_id = %self.trip_id,
                            spots_left = snapshot.spots_left,
                            "Availability refreshed"
                        );
                        tx.send_replace(Some(snapshot));
                    }
                    // Keep showing the last reading.
                    Ok(None) => {
                        warn!(trip_id = %self.trip_id, "No capacity found for trip");
                    }
                    Err(e) => {
                        warn!(trip_id = %self.trip_id, "Availability check failed: {}", e);
                    }
                }
            }
        });

        AvailabilityHandle { rx, task }
    }
}

/// Live view of the poller's latest reading. Dropping it stops the poll; a
/// fetch still in flight at that point is discarded with the task.
pub struct AvailabilityHandle {
    rx: watch::Receiver<Option<AvailabilitySnapshot>>,
    task: JoinHandle<()>,
}

impl AvailabilityHandle {
    pub fn latest(&self) -> Option<AvailabilitySnapshot> {
        *self.rx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<AvailabilitySnapshot>> {
        self.rx.clone()
    }
}

impl Drop for AvailabilityHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use omm_core::{FixedClock, TripCapacity};
    use omm_store::MemoryBackend;

    fn poller(backend: Arc<MemoryBackend>, trip_id: Uuid) -> AvailabilityPoller {
        AvailabilityPoller::new(
            backend,
            Arc::new(FixedClock::new(Utc::now())),
            trip_id,
            Duration::from_secs(30),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_on_start_and_each_interval() {
        let backend = Arc::new(MemoryBackend::new());
        let trip_id = Uuid::new_v4();
        backend.put_capacity(TripCapacity {
            trip_id,
            max_participants: 8,
            current_participants: 5,
        });

        let handle = poller(backend.clone(), trip_id).spawn();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(handle.latest().unwrap().spots_left, 3);

        backend.put_capacity(TripCapacity {
            trip_id,
            max_participants: 8,
            current_participants: 8,
        });
        tokio::time::sleep(Duration::from_secs(30)).await;

        let snapshot = handle.latest().unwrap();
        assert_eq!(snapshot.spots_left, 0);
        assert!(!snapshot.is_available);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_previous_snapshot() {
        let backend = Arc::new(MemoryBackend::new());
        let trip_id = Uuid::new_v4();
        backend.put_capacity(TripCapacity {
            trip_id,
            max_participants: 12,
            current_participants: 2,
        });

        let handle = poller(backend.clone(), trip_id).spawn();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(handle.latest().unwrap().spots_left, 10);

        backend.fail_reads(true);
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(handle.latest().unwrap().spots_left, 10);
    }

    #[tokio::test]
    async fn test_fetch_without_capacity_row() {
        let backend = Arc::new(MemoryBackend::new());
        let poller = poller(backend, Uuid::new_v4());
        assert!(poller.fetch().await.unwrap().is_none());
    }
}
