use uuid::Uuid;

/// Pushed to availability subscribers whenever a poll lands
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct AvailabilityChangedEvent {
    pub trip_id: Uuid,
    pub spots_left: i32,
    pub is_available: bool,
    pub timestamp: i64,
}
