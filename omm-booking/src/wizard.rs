use std::sync::Arc;

use omm_core::{
    BookingRepository, Clock, KeyValueStore, Notifier, ProfileRepository, TripRepository,
    UserProfile, WizardSettings,
};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

use crate::gateway::{SubmissionGateway, SubmitError};
use crate::models::{
    AvailabilitySnapshot, BookingDraft, InsuranceOption, Participant, ParticipantField,
    PaymentPlan, Preferences, TripSummary,
};
use crate::persister::ProgressPersister;
use crate::poller::{AvailabilityHandle, AvailabilityPoller};
use crate::pricing::PriceCalculator;
use crate::sequencer::{SequencerError, StepSequencer};
use crate::steps::{StepDefinition, StepId, WizardMode};

/// Everything a wizard needs from the outside world
#[derive(Clone)]
pub struct WizardDeps {
    pub trips: Arc<dyn TripRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub store: Arc<dyn KeyValueStore>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
    pub settings: WizardSettings,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("Trip not found: {0}")]
    TripNotFound(Uuid),

    #[error("Failed to load trip details: {0}")]
    TripLoad(String),

    #[error("Participant not found: {0}")]
    ParticipantNotFound(String),

    #[error("The primary participant cannot be removed")]
    CannotRemovePrimary,

    #[error("At least one participant is required")]
    CannotRemoveLast,

    #[error("Step validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Already on the final step")]
    AtFinalStep,

    #[error("Booking can only be submitted from the final step")]
    NotAtFinalStep,

    #[error("Booking already submitted: {0}")]
    AlreadySubmitted(Uuid),

    #[error("Booking submission failed: {0}")]
    Submission(String),
}

impl From<SequencerError> for WizardError {
    fn from(err: SequencerError) -> Self {
        match err {
            SequencerError::Validation(errors) => WizardError::Validation(errors),
            SequencerError::AtFinalStep => WizardError::AtFinalStep,
        }
    }
}

impl From<SubmitError> for WizardError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Validation(errors) => WizardError::Validation(errors),
            SubmitError::Remote(msg) => WizardError::Submission(msg),
        }
    }
}

/// Serializable snapshot of the wizard for rendering
#[derive(Debug, Clone, Serialize)]
pub struct WizardView {
    pub trip_id: Uuid,
    pub mode: WizardMode,
    pub step_index: usize,
    pub steps: &'static [StepDefinition],
    pub current_step: StepId,
    pub current_step_definition: StepDefinition,
    pub is_last_step: bool,
    pub errors: Vec<String>,
    pub draft: BookingDraft,
    pub availability: Option<AvailabilitySnapshot>,
    pub can_book: bool,
    pub low_stock: bool,
    pub is_returning_customer: bool,
    pub restored_progress: bool,
    pub submitted_booking_id: Option<Uuid>,
}

/// The multi-step booking flow for one user and one trip.
///
/// Every edit recomputes pricing and schedules a debounced progress save.
/// Dropping the wizard stops the availability poll and discards any save
/// that has not fired yet.
pub struct BookingWizard {
    trip_id: Uuid,
    user_id: String,
    draft: BookingDraft,
    sequencer: StepSequencer,
    profile: Option<UserProfile>,
    is_returning_customer: bool,
    restored_progress: bool,
    submitted: Option<Uuid>,
    low_stock_threshold: i32,
    pricing: PriceCalculator,
    persister: ProgressPersister,
    gateway: SubmissionGateway,
    availability: AvailabilityHandle,
    notifier: Arc<dyn Notifier>,
}

impl BookingWizard {
    /// Load the trip, the user's profile, their booking history and any saved
    /// progress in parallel, then start polling availability.
    pub async fn mount(deps: &WizardDeps, trip_id: Uuid, user_id: &str) -> Result<Self, WizardError> {
        let persister = ProgressPersister::new(
            deps.store.clone(),
            deps.clock.clone(),
            user_id,
            trip_id,
            deps.settings.debounce(),
            deps.settings.progress_ttl(),
        );

        let (trip, profile, prior_booking, saved) = tokio::join!(
            deps.trips.get_trip(trip_id),
            deps.profiles.get_profile(user_id),
            deps.bookings.has_prior_booking(user_id),
            persister.load(),
        );

        let trip = match trip {
            Ok(Some(trip)) => trip,
            Ok(None) => {
                deps.notifier.error("Error", "Failed to load trip details");
                return Err(WizardError::TripNotFound(trip_id));
            }
            Err(e) => {
                warn!(%trip_id, "Failed to load trip: {}", e);
                deps.notifier.error("Error", "Failed to load trip details");
                return Err(WizardError::TripLoad(e.to_string()));
            }
        };

        let profile = profile.unwrap_or_else(|e| {
            warn!(user_id, "Failed to load profile: {}", e);
            None
        });
        let is_returning_customer = prior_booking.unwrap_or_else(|e| {
            warn!(user_id, "Failed to check booking history: {}", e);
            false
        });
        let saved = saved
            .unwrap_or_else(|e| {
                warn!(%trip_id, "Ignoring saved booking progress: {}", e);
                None
            })
            .filter(|progress| {
                let usable = progress.draft.is_well_formed();
                if !usable {
                    warn!(%trip_id, "Ignoring saved booking progress without a single primary participant");
                }
                usable
            });

        let summary = TripSummary::from(&trip);
        let (mut draft, sequencer, restored_progress) = match saved {
            Some(progress) => {
                info!(%trip_id, step = progress.step_index, "Restoring saved booking progress");
                let mut draft = progress.draft;
                draft.trip = summary;
                (draft, StepSequencer::restore(progress.mode, progress.step_index), true)
            }
            None => {
                let mut draft = BookingDraft::new(summary);
                if let Some(profile) = &profile {
                    draft.prefill_primary(profile);
                }
                (draft, StepSequencer::new(WizardMode::Full), false)
            }
        };

        let pricing = PriceCalculator::new(deps.settings.pricing.clone());
        pricing.apply(&mut draft);

        let availability = AvailabilityPoller::new(
            deps.trips.clone(),
            deps.clock.clone(),
            trip_id,
            deps.settings.poll_interval(),
        )
        .spawn();

        Ok(Self {
            trip_id,
            user_id: user_id.to_string(),
            draft,
            sequencer,
            profile,
            is_returning_customer,
            restored_progress,
            submitted: None,
            low_stock_threshold: deps.settings.low_stock_threshold,
            pricing,
            persister,
            gateway: SubmissionGateway::new(
                deps.bookings.clone(),
                deps.notifier.clone(),
                deps.clock.clone(),
            ),
            availability,
            notifier: deps.notifier.clone(),
        })
    }

    pub fn trip_id(&self) -> Uuid {
        self.trip_id
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn mode(&self) -> WizardMode {
        self.sequencer.mode()
    }

    pub fn step_index(&self) -> usize {
        self.sequencer.current_index()
    }

    pub fn current_step(&self) -> StepId {
        self.sequencer.current_step().id
    }

    pub fn errors(&self) -> &[String] {
        self.sequencer.errors()
    }

    pub fn is_returning_customer(&self) -> bool {
        self.is_returning_customer
    }

    pub fn availability(&self) -> Option<AvailabilitySnapshot> {
        self.availability.latest()
    }

    pub fn subscribe_availability(&self) -> watch::Receiver<Option<AvailabilitySnapshot>> {
        self.availability.subscribe()
    }

    /// Booking actions stay enabled until a reading says the trip is full
    pub fn can_book(&self) -> bool {
        self.availability().map_or(true, |a| a.is_available)
    }

    pub fn low_stock(&self) -> bool {
        self.availability()
            .is_some_and(|a| a.is_available && a.spots_left <= self.low_stock_threshold)
    }

    pub fn view(&self) -> WizardView {
        WizardView {
            trip_id: self.trip_id,
            mode: self.sequencer.mode(),
            step_index: self.sequencer.current_index(),
            steps: self.sequencer.steps(),
            current_step: self.sequencer.current_step().id,
            current_step_definition: *self.sequencer.current_step(),
            is_last_step: self.sequencer.is_last_step(),
            errors: self.sequencer.errors().to_vec(),
            draft: self.draft.clone(),
            availability: self.availability(),
            can_book: self.can_book(),
            low_stock: self.low_stock(),
            is_returning_customer: self.is_returning_customer,
            restored_progress: self.restored_progress,
            submitted_booking_id: self.submitted,
        }
    }

    pub fn add_participant(&mut self) -> String {
        let participant = Participant::new_temporary(false);
        let id = participant.id.clone();
        self.draft.participants.push(participant);
        self.touch();
        id
    }

    pub fn remove_participant(&mut self, participant_id: &str) -> Result<(), WizardError> {
        let index = self
            .draft
            .participants
            .iter()
            .position(|p| p.id == participant_id)
            .ok_or_else(|| WizardError::ParticipantNotFound(participant_id.to_string()))?;

        if self.draft.participants.len() == 1 {
            return Err(WizardError::CannotRemoveLast);
        }
        if self.draft.participants[index].is_primary {
            return Err(WizardError::CannotRemovePrimary);
        }

        self.draft.participants.remove(index);
        self.touch();
        Ok(())
    }

    pub fn update_participant(
        &mut self,
        participant_id: &str,
        field: ParticipantField,
        value: impl Into<String>,
    ) -> Result<(), WizardError> {
        let participant = self
            .draft
            .participant_mut(participant_id)
            .ok_or_else(|| WizardError::ParticipantNotFound(participant_id.to_string()))?;
        participant.set(field, value.into());
        self.touch();
        Ok(())
    }

    pub fn set_preferences(&mut self, preferences: Preferences) {
        self.draft.preferences = preferences;
        self.touch();
    }

    pub fn set_insurance(&mut self, insurance: InsuranceOption) {
        self.draft.insurance = insurance;
        self.touch();
    }

    pub fn set_payment_plan(&mut self, plan: PaymentPlan) {
        self.draft.payment_plan = Some(plan);
        self.touch();
    }

    pub fn set_consents(&mut self, agreed_to_terms: bool, agreed_to_cancellation_policy: bool) {
        self.draft.agreed_to_terms = agreed_to_terms;
        self.draft.agreed_to_cancellation_policy = agreed_to_cancellation_policy;
        self.touch();
    }

    pub fn advance(&mut self) -> Result<StepId, WizardError> {
        let step = self.sequencer.advance(&self.draft)?;
        self.schedule_save();
        Ok(step)
    }

    pub fn retreat(&mut self) -> StepId {
        let step = self.sequencer.retreat();
        self.schedule_save();
        step
    }

    pub fn switch_mode(&mut self, mode: WizardMode) {
        self.sequencer.switch_mode(mode);
        self.schedule_save();
    }

    /// Start over: back to the first step with a fresh draft, saved progress deleted
    pub async fn reset(&mut self) {
        if let Err(e) = self.persister.clear().await {
            warn!(trip_id = %self.trip_id, "Failed to clear booking progress: {}", e);
        }

        let mut draft = BookingDraft::new(self.draft.trip.clone());
        if let Some(profile) = &self.profile {
            draft.prefill_primary(profile);
        }
        self.pricing.apply(&mut draft);
        self.draft = draft;
        self.sequencer.reset();
        self.restored_progress = false;
    }

    /// Submit from the final step. Validation failures are recorded as the
    /// step's errors; remote failures leave the wizard untouched for a retry.
    pub async fn submit<F>(&mut self, on_complete: F) -> Result<Uuid, WizardError>
    where
        F: FnOnce(&BookingDraft),
    {
        if let Some(booking_id) = self.submitted {
            return Err(WizardError::AlreadySubmitted(booking_id));
        }
        if !self.sequencer.is_last_step() {
            return Err(WizardError::NotAtFinalStep);
        }

        let result = self
            .gateway
            .submit(&self.user_id, self.sequencer.mode(), &self.draft, on_complete)
            .await;

        match result {
            Ok(booking_id) => {
                self.submitted = Some(booking_id);
                self.sequencer.set_errors(Vec::new());
                if let Err(e) = self.persister.clear().await {
                    warn!(trip_id = %self.trip_id, "Failed to clear booking progress: {}", e);
                }
                Ok(booking_id)
            }
            Err(SubmitError::Validation(errors)) => {
                self.sequencer.set_errors(errors.clone());
                Err(WizardError::Validation(errors))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Save immediately instead of waiting out the debounce
    pub async fn save_progress(&self) -> Result<(), WizardError> {
        self.persister
            .save_now(self.sequencer.current_index(), self.sequencer.mode(), self.draft.clone())
            .await
            .map_err(|e| {
                warn!(trip_id = %self.trip_id, "Failed to save booking progress: {}", e);
                self.notifier.error("Error", "Failed to save progress");
                WizardError::Submission(e.to_string())
            })?;
        self.notifier.success("Progress Saved", "You can continue this booking later.");
        Ok(())
    }

    fn touch(&mut self) {
        self.pricing.apply(&mut self.draft);
        self.schedule_save();
    }

    fn schedule_save(&self) {
        if self.submitted.is_some() {
            return;
        }
        self.persister.save(
            self.sequencer.current_index(),
            self.sequencer.mode(),
            self.draft.clone(),
        );
    }
}
