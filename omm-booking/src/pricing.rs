use omm_core::PricingSettings;
use serde::{Deserialize, Serialize};

use crate::models::{BookingDraft, InsuranceOption, PaymentPlan};

/// Amounts owed for a draft, in minor units
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceQuote {
    pub total_cents: i32,
    /// Due at booking time
    pub deposit_cents: i32,
}

pub struct PriceCalculator {
    settings: PricingSettings,
}

impl PriceCalculator {
    pub fn new(settings: PricingSettings) -> Self {
        Self { settings }
    }

    pub fn insurance_fee(&self, insurance: InsuranceOption) -> i32 {
        match insurance {
            InsuranceOption::None => 0,
            InsuranceOption::Basic => self.settings.basic_insurance_cents,
            InsuranceOption::Comprehensive => self.settings.comprehensive_insurance_cents,
        }
    }

    pub fn quote(
        &self,
        price_per_person_cents: i32,
        participants: u32,
        insurance: InsuranceOption,
        plan: Option<PaymentPlan>,
    ) -> PriceQuote {
        let per_person = i64::from(price_per_person_cents) + i64::from(self.insurance_fee(insurance));
        let total = per_person * i64::from(participants);

        // No plan chosen yet shows the pay-in-full amount.
        let deposit = match plan.unwrap_or(PaymentPlan::Full) {
            PaymentPlan::Full => total,
            PaymentPlan::Deposit => {
                ceil_div(total * i64::from(self.settings.deposit_percent), 100)
            }
            PaymentPlan::Installments => {
                ceil_div(total, i64::from(self.settings.installment_count.max(1)))
            }
        };

        PriceQuote {
            total_cents: clamp_i32(total),
            deposit_cents: clamp_i32(deposit),
        }
    }

    /// Recompute the draft's computed amounts in place
    pub fn apply(&self, draft: &mut BookingDraft) -> PriceQuote {
        let quote = self.quote(
            draft.trip.price_cents,
            draft.participant_count(),
            draft.insurance,
            draft.payment_plan,
        );
        draft.total_cents = quote.total_cents;
        draft.deposit_cents = quote.deposit_cents;
        quote
    }
}

fn ceil_div(numerator: i64, denominator: i64) -> i64 {
    (numerator + denominator - 1) / denominator
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
