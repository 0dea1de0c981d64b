use async_trait::async_trait;
use omm_core::{
    BookingRecord, BookingRepository, BoxError, CoreError, KeyValueStore, ProfileRepository, TripCapacity,
    TripDetails, TripRepository, UserProfile,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    trips: HashMap<Uuid, TripDetails>,
    capacity: HashMap<Uuid, TripCapacity>,
    profiles: HashMap<String, UserProfile>,
    bookings: Vec<BookingRecord>,
    returning: HashSet<String>,
    kv: HashMap<String, String>,
}

/// In-process stand-in for the remote store and progress storage.
///
/// Failure switches let callers simulate an unreachable backend:
/// `fail_reads` (trip, capacity and prior-booking reads), `fail_profiles`,
/// `fail_writes` (booking inserts) and `fail_storage` (saved progress).
#[derive(Default)]
pub struct MemoryBackend {
    inner: RwLock<Inner>,
    fail_reads: AtomicBool,
    fail_profiles: AtomicBool,
    fail_writes: AtomicBool,
    fail_storage: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn put_trip(&self, trip: TripDetails) {
        self.write().trips.insert(trip.id, trip);
    }

    pub fn put_capacity(&self, capacity: TripCapacity) {
        self.write().capacity.insert(capacity.trip_id, capacity);
    }

    pub fn put_profile(&self, profile: UserProfile) {
        self.write().profiles.insert(profile.user_id.clone(), profile);
    }

    /// Flag a user as having booked before without storing a booking row
    pub fn mark_returning(&self, user_id: &str) {
        self.write().returning.insert(user_id.to_string());
    }

    pub fn bookings(&self) -> Vec<BookingRecord> {
        self.read().bookings.clone()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_profiles(&self, fail: bool) {
        self.fail_profiles.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_storage(&self, fail: bool) {
        self.fail_storage.store(fail, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, what: &str) -> Result<(), BoxError> {
        if flag.load(Ordering::SeqCst) {
            return Err(Box::new(CoreError::Remote(format!("{} unavailable", what))));
        }
        Ok(())
    }

    fn check_storage(&self) -> Result<(), BoxError> {
        if self.fail_storage.load(Ordering::SeqCst) {
            return Err(Box::new(CoreError::Storage("progress storage unavailable".to_string())));
        }
        Ok(())
    }
}

#[async_trait]
impl TripRepository for MemoryBackend {
    async fn get_trip(&self, trip_id: Uuid) -> Result<Option<TripDetails>, BoxError> {
        Self::check(&self.fail_reads, "trip store")?;
        Ok(self.read().trips.get(&trip_id).cloned())
    }

    async fn get_capacity(&self, trip_id: Uuid) -> Result<Option<TripCapacity>, BoxError> {
        Self::check(&self.fail_reads, "trip store")?;
        Ok(self.read().capacity.get(&trip_id).copied())
    }
}

#[async_trait]
impl BookingRepository for MemoryBackend {
    async fn insert_booking(&self, booking: &BookingRecord) -> Result<Uuid, BoxError> {
        Self::check(&self.fail_writes, "booking store")?;
        self.write().bookings.push(booking.clone());
        Ok(booking.id)
    }

    async fn has_prior_booking(&self, user_id: &str) -> Result<bool, BoxError> {
        Self::check(&self.fail_reads, "booking store")?;
        let inner = self.read();
        Ok(inner.returning.contains(user_id) || inner.bookings.iter().any(|b| b.user_id == user_id))
    }
}

#[async_trait]
impl ProfileRepository for MemoryBackend {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, BoxError> {
        Self::check(&self.fail_profiles, "profile store")?;
        Ok(self.read().profiles.get(user_id).cloned())
    }
}

#[async_trait]
impl KeyValueStore for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, BoxError> {
        self.check_storage()?;
        Ok(self.read().kv.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), BoxError> {
        self.check_storage()?;
        self.write().kv.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), BoxError> {
        self.check_storage()?;
        self.write().kv.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(user_id: &str) -> BookingRecord {
        BookingRecord {
            id: Uuid::new_v4(),
            trip_id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            participant_count: 1,
            insurance: "none".to_string(),
            payment_plan: "full".to_string(),
            total_cents: 100_000,
            deposit_cents: 100_000,
            currency: "USD".to_string(),
            status: "pending".to_string(),
            special_requests: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_prior_booking_after_insert() {
        let backend = MemoryBackend::new();
        assert!(!backend.has_prior_booking("user-7").await.unwrap());

        backend.insert_booking(&record("user-7")).await.unwrap();
        assert!(backend.has_prior_booking("user-7").await.unwrap());
        assert!(!backend.has_prior_booking("user-8").await.unwrap());
    }

    #[tokio::test]
    async fn test_failing_writes_store_nothing() {
        let backend = MemoryBackend::new();
        backend.fail_writes(true);
        assert!(backend.insert_booking(&record("user-7")).await.is_err());
        assert!(backend.bookings().is_empty());
    }

    #[tokio::test]
    async fn test_key_value_roundtrip() {
        let backend = MemoryBackend::new();
        backend.set("booking-progress-1", "{}").await.unwrap();
        assert_eq!(backend.get("booking-progress-1").await.unwrap().as_deref(), Some("{}"));

        backend.delete("booking-progress-1").await.unwrap();
        assert!(backend.get("booking-progress-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failing_storage_reports_storage_error() {
        let backend = MemoryBackend::new();
        backend.fail_storage(true);

        let err = backend.set("booking-progress-1", "{}").await.unwrap_err();
        assert_eq!(err.to_string(), "Storage error: progress storage unavailable");

        backend.fail_storage(false);
        assert!(backend.get("booking-progress-1").await.unwrap().is_none());
    }
}
