pub mod clock;
pub mod notify;
pub mod records;
pub mod repository;
pub mod settings;
pub mod storage;

pub use clock::{Clock, FixedClock, SystemClock};
pub use notify::{Notifier, RecordingNotifier, TracingNotifier};
pub use records::{BookingRecord, SenseiSummary, TripCapacity, TripDetails, UserProfile};
pub use repository::{BookingRepository, ProfileRepository, TripRepository};
pub use settings::{PricingSettings, WizardSettings};
pub use storage::KeyValueStore;

/// Error type returned by the remote-store and storage ports.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures raised by port implementations, boxed into `BoxError`.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Remote store error: {0}")]
    Remote(String),
}
