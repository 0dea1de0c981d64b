use chrono::{DateTime, NaiveDate, Utc};
use omm_shared::Masked;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The guide hosting a trip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SenseiSummary {
    pub id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// A trip row joined with its Sensei.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripDetails {
    pub id: Uuid,
    pub title: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Per-person price in minor units
    pub price_cents: i32,
    pub currency: String,
    pub max_participants: i32,
    pub sensei: Option<SenseiSummary>,
}

/// Capacity counters for a trip, as stored remotely.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TripCapacity {
    pub trip_id: Uuid,
    pub max_participants: i32,
    pub current_participants: i32,
}

impl TripCapacity {
    pub fn spots_left(&self) -> i32 {
        self.max_participants - self.current_participants
    }
}

/// Saved customer profile, used to prefill the primary participant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Masked<String>,
    pub phone: Option<Masked<String>>,
    pub date_of_birth: Option<NaiveDate>,
}

/// The summary row written when a booking is submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub user_id: String,
    pub participant_count: i32,
    pub insurance: String,
    pub payment_plan: String,
    pub total_cents: i32,
    pub deposit_cents: i32,
    pub currency: String,
    pub status: String,
    pub special_requests: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spots_left() {
        let capacity = TripCapacity {
            trip_id: Uuid::new_v4(),
            max_participants: 12,
            current_participants: 9,
        };
        assert_eq!(capacity.spots_left(), 3);
    }
}
