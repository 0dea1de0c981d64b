use chrono::{DateTime, NaiveDate, Utc};
use omm_core::{TripCapacity, TripDetails, UserProfile};
use omm_shared::Masked;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::steps::WizardMode;

/// Travel insurance selection, priced per participant
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InsuranceOption {
    #[default]
    None,
    Basic,
    Comprehensive,
}

impl InsuranceOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsuranceOption::None => "none",
            InsuranceOption::Basic => "basic",
            InsuranceOption::Comprehensive => "comprehensive",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentPlan {
    Full,
    Deposit,
    Installments,
}

impl PaymentPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentPlan::Full => "full",
            PaymentPlan::Deposit => "deposit",
            PaymentPlan::Installments => "installments",
        }
    }
}

/// Trip identity carried on the draft
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripSummary {
    pub id: Uuid,
    pub title: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price_cents: i32,
    pub currency: String,
}

impl From<&TripDetails> for TripSummary {
    fn from(trip: &TripDetails) -> Self {
        Self {
            id: trip.id,
            title: trip.title.clone(),
            destination: trip.destination.clone(),
            start_date: trip.start_date,
            end_date: trip.end_date,
            price_cents: trip.price_cents,
            currency: trip.currency.clone(),
        }
    }
}

/// Editable participant fields, one per form input
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantField {
    FirstName,
    LastName,
    Email,
    Phone,
    DateOfBirth,
    Nationality,
    DietaryRequirements,
    MedicalConditions,
    EmergencyContactName,
    EmergencyContactPhone,
    EmergencyContactRelationship,
}

/// One traveler on the booking
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Participant {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Masked<String>,
    pub phone: Masked<String>,
    /// Kept as entered (ISO date expected)
    pub date_of_birth: Masked<String>,
    pub nationality: String,
    pub dietary_requirements: String,
    pub medical_conditions: Masked<String>,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: Masked<String>,
    pub emergency_contact_relationship: String,
    pub is_primary: bool,
}

impl Participant {
    /// New blank participant with a temporary client-side id
    pub fn new_temporary(is_primary: bool) -> Self {
        Self {
            id: format!("temp-{}", Uuid::new_v4().simple()),
            is_primary,
            ..Default::default()
        }
    }

    pub fn set(&mut self, field: ParticipantField, value: String) {
        match field {
            ParticipantField::FirstName => self.first_name = value,
            ParticipantField::LastName => self.last_name = value,
            ParticipantField::Email => self.email = Masked(value),
            ParticipantField::Phone => self.phone = Masked(value),
            ParticipantField::DateOfBirth => self.date_of_birth = Masked(value),
            ParticipantField::Nationality => self.nationality = value,
            ParticipantField::DietaryRequirements => self.dietary_requirements = value,
            ParticipantField::MedicalConditions => self.medical_conditions = Masked(value),
            ParticipantField::EmergencyContactName => self.emergency_contact_name = value,
            ParticipantField::EmergencyContactPhone => self.emergency_contact_phone = Masked(value),
            ParticipantField::EmergencyContactRelationship => {
                self.emergency_contact_relationship = value
            }
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// Free-text preferences collected on the preferences step
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Preferences {
    pub room_preference: String,
    pub accessibility_needs: String,
    pub special_requests: String,
    pub referral_source: String,
}

/// The in-progress booking held by the wizard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingDraft {
    pub trip: TripSummary,
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub insurance: InsuranceOption,
    #[serde(default)]
    pub payment_plan: Option<PaymentPlan>,
    #[serde(default)]
    pub total_cents: i32,
    #[serde(default)]
    pub deposit_cents: i32,
    #[serde(default)]
    pub agreed_to_terms: bool,
    #[serde(default)]
    pub agreed_to_cancellation_policy: bool,
}

impl BookingDraft {
    /// Defaults for a fresh wizard: one blank primary participant
    pub fn new(trip: TripSummary) -> Self {
        Self {
            trip,
            participants: vec![Participant::new_temporary(true)],
            preferences: Preferences::default(),
            insurance: InsuranceOption::None,
            payment_plan: None,
            total_cents: 0,
            deposit_cents: 0,
            agreed_to_terms: false,
            agreed_to_cancellation_policy: false,
        }
    }

    pub fn primary(&self) -> Option<&Participant> {
        self.participants.iter().find(|p| p.is_primary)
    }

    pub fn participant_mut(&mut self, participant_id: &str) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.id == participant_id)
    }

    /// At least one participant and exactly one of them primary
    pub fn is_well_formed(&self) -> bool {
        self.participants.iter().filter(|p| p.is_primary).count() == 1
    }

    pub fn participant_count(&self) -> u32 {
        self.participants.len() as u32
    }

    /// Copies saved profile details into the primary participant's blank fields
    pub fn prefill_primary(&mut self, profile: &UserProfile) {
        let Some(primary) = self.participants.iter_mut().find(|p| p.is_primary) else {
            return;
        };

        if primary.first_name.trim().is_empty() {
            primary.first_name = profile.first_name.clone();
        }
        if primary.last_name.trim().is_empty() {
            primary.last_name = profile.last_name.clone();
        }
        if primary.email.is_blank() {
            primary.email = profile.email.clone();
        }
        if primary.phone.is_blank() {
            if let Some(phone) = &profile.phone {
                primary.phone = phone.clone();
            }
        }
        if primary.date_of_birth.is_blank() {
            if let Some(dob) = profile.date_of_birth {
                primary.date_of_birth = Masked(dob.format("%Y-%m-%d").to_string());
            }
        }
    }
}

/// Advisory remaining-capacity reading
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailabilitySnapshot {
    pub spots_left: i32,
    pub is_available: bool,
    pub checked_at: DateTime<Utc>,
}

impl AvailabilitySnapshot {
    pub fn from_capacity(capacity: &TripCapacity, checked_at: DateTime<Utc>) -> Self {
        // Overbooked trips report zero rather than a negative count.
        let spots_left = capacity.spots_left().max(0);
        Self {
            spots_left,
            is_available: spots_left > 0,
            checked_at,
        }
    }
}

/// The record written to durable storage for a trip's in-progress booking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistedProgress {
    pub step_index: usize,
    #[serde(default)]
    pub mode: WizardMode,
    pub draft: BookingDraft,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_trip;

    #[test]
    fn test_new_draft_has_single_blank_primary() {
        let draft = BookingDraft::new(sample_trip());
        assert_eq!(draft.participants.len(), 1);

        let primary = draft.primary().unwrap();
        assert!(primary.is_primary);
        assert!(primary.id.starts_with("temp-"));
        assert!(primary.first_name.is_empty());
        assert!(primary.email.is_blank());
        assert_eq!(draft.payment_plan, None);
        assert!(!draft.agreed_to_terms);
    }

    #[test]
    fn test_prefill_keeps_typed_values() {
        let mut draft = BookingDraft::new(sample_trip());
        draft.participants[0].first_name = "Aiko".to_string();

        let profile = UserProfile {
            user_id: "user-1".to_string(),
            first_name: "Profile".to_string(),
            last_name: "Tanaka".to_string(),
            email: Masked::from("aiko@example.com"),
            phone: None,
            date_of_birth: NaiveDate::from_ymd_opt(1990, 6, 15),
        };
        draft.prefill_primary(&profile);

        let primary = draft.primary().unwrap();
        assert_eq!(primary.first_name, "Aiko");
        assert_eq!(primary.last_name, "Tanaka");
        assert_eq!(primary.email.expose(), "aiko@example.com");
        assert!(primary.phone.is_blank());
        assert_eq!(primary.date_of_birth.expose(), "1990-06-15");
    }

    #[test]
    fn test_full_capacity_is_unavailable() {
        let capacity = TripCapacity {
            trip_id: Uuid::new_v4(),
            max_participants: 10,
            current_participants: 10,
        };
        let snapshot = AvailabilitySnapshot::from_capacity(&capacity, Utc::now());
        assert_eq!(snapshot.spots_left, 0);
        assert!(!snapshot.is_available);
    }

    #[test]
    fn test_participant_debug_masks_contact_details() {
        let mut participant = Participant::new_temporary(true);
        participant.set(ParticipantField::Email, "kenji@example.com".to_string());
        let debug = format!("{:?}", participant);
        assert!(!debug.contains("kenji@example.com"));
    }
}
