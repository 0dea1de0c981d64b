use async_trait::async_trait;
use uuid::Uuid;

use crate::records::{BookingRecord, TripCapacity, TripDetails, UserProfile};
use crate::BoxError;

/// Read access to trips and their capacity counters
#[async_trait]
pub trait TripRepository: Send + Sync {
    /// Trip row joined with the hosting Sensei
    async fn get_trip(&self, trip_id: Uuid) -> Result<Option<TripDetails>, BoxError>;

    async fn get_capacity(&self, trip_id: Uuid) -> Result<Option<TripCapacity>, BoxError>;
}

/// Booking summary rows
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert_booking(&self, booking: &BookingRecord) -> Result<Uuid, BoxError>;

    /// Whether the user has booked anything before (returning customer)
    async fn has_prior_booking(&self, user_id: &str) -> Result<bool, BoxError>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, BoxError>;
}
