pub mod gateway;
pub mod models;
pub mod persister;
pub mod poller;
pub mod pricing;
pub mod sequencer;
pub mod steps;
pub mod validator;
pub mod wizard;

#[cfg(test)]
pub(crate) mod test_support;

pub use gateway::{SubmissionGateway, SubmitError};
pub use models::{
    AvailabilitySnapshot, BookingDraft, InsuranceOption, Participant, ParticipantField,
    PaymentPlan, PersistedProgress, Preferences, TripSummary,
};
pub use persister::{PersistError, ProgressPersister};
pub use poller::{AvailabilityHandle, AvailabilityPoller};
pub use pricing::{PriceCalculator, PriceQuote};
pub use sequencer::{SequencerError, StepSequencer};
pub use steps::{StepDefinition, StepId, WizardMode};
pub use wizard::{BookingWizard, WizardDeps, WizardError, WizardView};
