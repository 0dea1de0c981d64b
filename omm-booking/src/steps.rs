use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    TripReview,
    Participants,
    Preferences,
    Insurance,
    Payment,
    Confirmation,
}

/// A static wizard step
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct StepDefinition {
    pub id: StepId,
    pub title: &'static str,
    pub description: &'static str,
    pub required: bool,
}

pub const FULL_FLOW: [StepDefinition; 6] = [
    StepDefinition {
        id: StepId::TripReview,
        title: "Trip Details",
        description: "Review your adventure",
        required: true,
    },
    StepDefinition {
        id: StepId::Participants,
        title: "Participants",
        description: "Who's traveling",
        required: true,
    },
    StepDefinition {
        id: StepId::Preferences,
        title: "Preferences",
        description: "Customize your experience",
        required: false,
    },
    StepDefinition {
        id: StepId::Insurance,
        title: "Insurance",
        description: "Protect your trip",
        required: false,
    },
    StepDefinition {
        id: StepId::Payment,
        title: "Payment",
        description: "Choose a payment plan",
        required: true,
    },
    StepDefinition {
        id: StepId::Confirmation,
        title: "Confirmation",
        description: "Review and book",
        required: true,
    },
];

/// Abbreviated flow offered to returning customers
pub const QUICK_FLOW: [StepDefinition; 3] = [
    StepDefinition {
        id: StepId::Participants,
        title: "Quick Details",
        description: "Confirm who's traveling",
        required: true,
    },
    StepDefinition {
        id: StepId::Payment,
        title: "Payment",
        description: "Choose a payment plan",
        required: true,
    },
    StepDefinition {
        id: StepId::Confirmation,
        title: "Confirm",
        description: "Review and book",
        required: true,
    },
];

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WizardMode {
    #[default]
    Full,
    Quick,
}

impl WizardMode {
    pub fn steps(self) -> &'static [StepDefinition] {
        match self {
            WizardMode::Full => &FULL_FLOW,
            WizardMode::Quick => &QUICK_FLOW,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_lengths() {
        assert_eq!(WizardMode::Full.steps().len(), 6);
        assert_eq!(WizardMode::Quick.steps().len(), 3);
    }

    #[test]
    fn test_both_flows_end_on_confirmation() {
        for mode in [WizardMode::Full, WizardMode::Quick] {
            assert_eq!(mode.steps().last().unwrap().id, StepId::Confirmation);
        }
    }
}
