use crate::models::{BookingDraft, Participant};
use crate::steps::{StepId, WizardMode};

/// Checks the draft for one step and returns display-ready error messages.
/// An empty list means the step passes.
pub fn validate(step: StepId, mode: WizardMode, draft: &BookingDraft) -> Vec<String> {
    match step {
        StepId::Participants => validate_participants(mode, draft),
        StepId::Payment => validate_payment(draft),
        StepId::Confirmation => validate_confirmation(draft),
        StepId::TripReview | StepId::Preferences | StepId::Insurance => Vec::new(),
    }
}

fn validate_participants(mode: WizardMode, draft: &BookingDraft) -> Vec<String> {
    let mut errors = Vec::new();

    for (index, participant) in draft.participants.iter().enumerate() {
        let n = index + 1;
        for (label, missing) in required_fields(participant) {
            if missing {
                errors.push(format!("{} required for participant {}", label, n));
            }
        }

        if mode == WizardMode::Full && participant.is_primary {
            if participant.emergency_contact_name.trim().is_empty() {
                errors.push("Emergency contact name required".to_string());
            }
            if participant.emergency_contact_phone.is_blank() {
                errors.push("Emergency contact phone required".to_string());
            }
        }
    }

    errors
}

fn required_fields(participant: &Participant) -> [(&'static str, bool); 5] {
    [
        ("First name", participant.first_name.trim().is_empty()),
        ("Last name", participant.last_name.trim().is_empty()),
        ("Email", participant.email.is_blank()),
        ("Phone", participant.phone.is_blank()),
        ("Date of birth", participant.date_of_birth.is_blank()),
    ]
}

fn validate_payment(draft: &BookingDraft) -> Vec<String> {
    if draft.payment_plan.is_none() {
        vec!["Payment plan selection required".to_string()]
    } else {
        Vec::new()
    }
}

fn validate_confirmation(draft: &BookingDraft) -> Vec<String> {
    if !draft.agreed_to_terms {
        vec!["Terms and conditions agreement required".to_string()]
    } else {
        Vec::new()
    }
}
