use std::sync::Arc;

use chrono::NaiveDate;
use omm_core::{
    FixedClock, RecordingNotifier, SenseiSummary, TripCapacity, TripDetails, UserProfile,
    WizardSettings,
};
use omm_shared::Masked;
use omm_store::MemoryBackend;
use uuid::Uuid;

use crate::models::{Participant, ParticipantField, TripSummary};
use crate::wizard::{BookingWizard, WizardDeps};

pub fn sample_trip() -> TripSummary {
    TripSummary {
        id: Uuid::new_v4(),
        title: "Kyoto Temple Trail".to_string(),
        destination: "Kyoto, Japan".to_string(),
        start_date: NaiveDate::from_ymd_opt(2027, 4, 2).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2027, 4, 9).unwrap(),
        price_cents: 185_000,
        currency: "USD".to_string(),
    }
}

pub fn complete_participant(is_primary: bool) -> Participant {
    let mut participant = Participant::new_temporary(is_primary);
    participant.set(ParticipantField::FirstName, "Haruto".to_string());
    participant.set(ParticipantField::LastName, "Mori".to_string());
    participant.set(ParticipantField::Email, "haruto@example.com".to_string());
    participant.set(ParticipantField::Phone, "+81 80 5555 0101".to_string());
    participant.set(ParticipantField::DateOfBirth, "1988-02-14".to_string());
    participant.set(ParticipantField::EmergencyContactName, "Sakura Mori".to_string());
    participant.set(ParticipantField::EmergencyContactPhone, "+81 80 5555 0102".to_string());
    participant
}

/// Backend holding one open trip, and a profile plus past booking for
/// "returning-user".
pub fn seeded_backend() -> (Arc<MemoryBackend>, TripDetails) {
    let backend = Arc::new(MemoryBackend::new());
    let trip = TripDetails {
        id: Uuid::new_v4(),
        title: "Hokkaido Powder Week".to_string(),
        destination: "Niseko, Japan".to_string(),
        start_date: NaiveDate::from_ymd_opt(2027, 1, 20).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2027, 1, 27).unwrap(),
        price_cents: 240_000,
        currency: "USD".to_string(),
        max_participants: 12,
        sensei: Some(SenseiSummary {
            id: Uuid::new_v4(),
            display_name: "Kenta Ito".to_string(),
            avatar_url: None,
        }),
    };
    backend.put_trip(trip.clone());
    backend.put_capacity(TripCapacity {
        trip_id: trip.id,
        max_participants: trip.max_participants,
        current_participants: 2,
    });
    backend.put_profile(UserProfile {
        user_id: "returning-user".to_string(),
        first_name: "Yuki".to_string(),
        last_name: "Nakamura".to_string(),
        email: Masked::from("yuki@example.com"),
        phone: Some(Masked::from("+81 70 1111 2222")),
        date_of_birth: NaiveDate::from_ymd_opt(1992, 11, 3),
    });
    backend.mark_returning("returning-user");

    (backend, trip)
}

pub fn deps(
    backend: Arc<MemoryBackend>,
    notifier: Arc<RecordingNotifier>,
    clock: Arc<FixedClock>,
) -> WizardDeps {
    WizardDeps {
        trips: backend.clone(),
        bookings: backend.clone(),
        profiles: backend.clone(),
        store: backend,
        notifier,
        clock,
        settings: WizardSettings::default(),
    }
}

/// Fill the five required fields of a participant
pub fn fill_participant(wizard: &mut BookingWizard, participant_id: &str) {
    let values = [
        (ParticipantField::FirstName, "Ren"),
        (ParticipantField::LastName, "Aoki"),
        (ParticipantField::Email, "ren@example.com"),
        (ParticipantField::Phone, "+81 90 0000 1111"),
        (ParticipantField::DateOfBirth, "1995-07-30"),
    ];
    for (field, value) in values {
        wizard.update_participant(participant_id, field, value).unwrap();
    }
}
