use std::sync::Arc;

use omm_core::{BookingRecord, BookingRepository, Clock, Notifier};
use tracing::{error, info};
use uuid::Uuid;

use crate::models::{BookingDraft, PaymentPlan};
use crate::steps::{StepId, WizardMode};
use crate::validator;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Booking is incomplete: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Booking could not be saved: {0}")]
    Remote(String),
}

/// Writes the final booking. One attempt per call; the caller's draft is
/// never modified, so a failed attempt can simply be retried.
pub struct SubmissionGateway {
    bookings: Arc<dyn BookingRepository>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl SubmissionGateway {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bookings,
            notifier,
            clock,
        }
    }

    pub fn summarize(&self, user_id: &str, draft: &BookingDraft) -> BookingRecord {
        let special_requests = draft.preferences.special_requests.trim();
        BookingRecord {
            id: Uuid::new_v4(),
            trip_id: draft.trip.id,
            user_id: user_id.to_string(),
            participant_count: draft.participants.len() as i32,
            insurance: draft.insurance.as_str().to_string(),
            payment_plan: draft.payment_plan.unwrap_or(PaymentPlan::Full).as_str().to_string(),
            total_cents: draft.total_cents,
            deposit_cents: draft.deposit_cents,
            currency: draft.trip.currency.clone(),
            status: "pending".to_string(),
            special_requests: (!special_requests.is_empty()).then(|| special_requests.to_string()),
            created_at: self.clock.now(),
        }
    }

    /// Validate the confirmation step, insert the booking summary, then hand
    /// the draft to `on_complete`.
    pub async fn submit<F>(
        &self,
        user_id: &str,
        mode: WizardMode,
        draft: &BookingDraft,
        on_complete: F,
    ) -> Result<Uuid, SubmitError>
    where
        F: FnOnce(&BookingDraft),
    {
        let errors = validator::validate(StepId::Confirmation, mode, draft);
        if !errors.is_empty() {
            return Err(SubmitError::Validation(errors));
        }

        let record = self.summarize(user_id, draft);
        match self.bookings.insert_booking(&record).await {
            Ok(booking_id) => {
                info!(
                    %booking_id,
                    trip_id = %draft.trip.id,
                    participants = record.participant_count,
                    total_cents = record.total_cents,
                    "Booking submitted"
                );
                self.notifier.success(
                    "Booking Submitted",
                    &format!("Your booking for {} has been received.", draft.trip.title),
                );
                on_complete(draft);
                Ok(booking_id)
            }
            Err(e) => {
                error!(trip_id = %draft.trip.id, "Failed to submit booking: {}", e);
                self.notifier.error(
                    "Booking Failed",
                    "We couldn't complete your booking. Please try again.",
                );
                Err(SubmitError::Remote(e.to_string()))
            }
        }
    }
}
