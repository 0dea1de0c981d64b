use serde::Serialize;

use crate::models::BookingDraft;
use crate::steps::{StepDefinition, StepId, WizardMode};
use crate::validator;

/// Tracks the current step of the active flow. Forward moves are guarded by
/// the validator; backward moves are not.
#[derive(Debug, Clone, Serialize)]
pub struct StepSequencer {
    mode: WizardMode,
    current_index: usize,
    errors: Vec<String>,
}

impl StepSequencer {
    pub fn new(mode: WizardMode) -> Self {
        Self {
            mode,
            current_index: 0,
            errors: Vec::new(),
        }
    }

    /// Rebuild at a saved position, clamped into the flow
    pub fn restore(mode: WizardMode, step_index: usize) -> Self {
        let last = mode.steps().len() - 1;
        Self {
            mode,
            current_index: step_index.min(last),
            errors: Vec::new(),
        }
    }

    pub fn mode(&self) -> WizardMode {
        self.mode
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn steps(&self) -> &'static [StepDefinition] {
        self.mode.steps()
    }

    pub fn current_step(&self) -> &'static StepDefinition {
        &self.mode.steps()[self.current_index]
    }

    pub fn is_last_step(&self) -> bool {
        self.current_index == self.mode.steps().len() - 1
    }

    /// Errors from the most recent rejected move
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn set_errors(&mut self, errors: Vec<String>) {
        self.errors = errors;
    }

    /// Move forward one step if the current step validates
    pub fn advance(&mut self, draft: &BookingDraft) -> Result<StepId, SequencerError> {
        let errors = validator::validate(self.current_step().id, self.mode, draft);
        if !errors.is_empty() {
            self.errors = errors.clone();
            return Err(SequencerError::Validation(errors));
        }

        if self.is_last_step() {
            return Err(SequencerError::AtFinalStep);
        }

        self.current_index += 1;
        self.errors.clear();
        Ok(self.current_step().id)
    }

    /// Move back one step; stays on the first step
    pub fn retreat(&mut self) -> StepId {
        self.current_index = self.current_index.saturating_sub(1);
        self.errors.clear();
        self.current_step().id
    }

    /// Swap flows. Always lands on the first step; the draft is untouched.
    pub fn switch_mode(&mut self, mode: WizardMode) {
        self.mode = mode;
        self.current_index = 0;
        self.errors.clear();
    }

    pub fn reset(&mut self) {
        self.current_index = 0;
        self.errors.clear();
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SequencerError {
    #[error("Step validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Already on the final step")]
    AtFinalStep,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentPlan;
    use crate::test_support::{complete_participant, sample_trip};

    fn valid_draft() -> BookingDraft {
        let mut draft = BookingDraft::new(sample_trip());
        draft.participants[0] = complete_participant(true);
        draft.payment_plan = Some(PaymentPlan::Full);
        draft.agreed_to_terms = true;
        draft
    }

    #[test]
    fn test_walks_full_flow() {
        let mut sequencer = StepSequencer::new(WizardMode::Full);
        let draft = valid_draft();

        assert_eq!(sequencer.advance(&draft).unwrap(), StepId::Participants);
        assert_eq!(sequencer.advance(&draft).unwrap(), StepId::Preferences);
        assert_eq!(sequencer.advance(&draft).unwrap(), StepId::Insurance);
        assert_eq!(sequencer.advance(&draft).unwrap(), StepId::Payment);
        assert_eq!(sequencer.advance(&draft).unwrap(), StepId::Confirmation);
        assert!(sequencer.is_last_step());
        assert_eq!(sequencer.advance(&draft), Err(SequencerError::AtFinalStep));
        assert_eq!(sequencer.current_index(), 5);
    }

    #[test]
    fn test_rejected_advance_keeps_index() {
        let mut sequencer = StepSequencer::new(WizardMode::Quick);
        let draft = BookingDraft::new(sample_trip());

        let result = sequencer.advance(&draft);
        assert!(matches!(result, Err(SequencerError::Validation(ref e)) if e.len() == 5));
        assert_eq!(sequencer.current_index(), 0);
        assert_eq!(sequencer.errors().len(), 5);
    }

    #[test]
    fn test_successful_advance_clears_errors() {
        let mut sequencer = StepSequencer::new(WizardMode::Quick);
        let mut draft = BookingDraft::new(sample_trip());
        assert!(sequencer.advance(&draft).is_err());

        draft.participants[0] = complete_participant(true);
        sequencer.advance(&draft).unwrap();
        assert!(sequencer.errors().is_empty());
        assert_eq!(sequencer.current_step().id, StepId::Payment);
    }

    #[test]
    fn test_retreat_floors_at_zero() {
        let mut sequencer = StepSequencer::new(WizardMode::Full);
        assert_eq!(sequencer.retreat(), StepId::TripReview);
        assert_eq!(sequencer.retreat(), StepId::TripReview);
        assert_eq!(sequencer.current_index(), 0);
    }

    #[test]
    fn test_switch_mode_resets_index() {
        let mut sequencer = StepSequencer::restore(WizardMode::Full, 4);
        assert_eq!(sequencer.current_step().id, StepId::Payment);

        sequencer.switch_mode(WizardMode::Quick);
        assert_eq!(sequencer.current_index(), 0);

        sequencer.switch_mode(WizardMode::Quick);
        assert_eq!(sequencer.current_index(), 0);
        assert_eq!(sequencer.steps().len(), 3);
    }

    #[test]
    fn test_restore_clamps_out_of_range_index() {
        let sequencer = StepSequencer::restore(WizardMode::Quick, 5);
        assert_eq!(sequencer.current_index(), 2);
    }
}
