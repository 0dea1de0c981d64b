use serde::Deserialize;
use std::time::Duration;

/// Tunables for the booking wizard, loaded from the `wizard` config section.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WizardSettings {
    pub availability_poll_seconds: u64,
    pub progress_debounce_ms: u64,
    pub progress_ttl_hours: i64,
    /// Spots-left at or below which the low-stock banner shows
    pub low_stock_threshold: i32,
    pub pricing: PricingSettings,
}

impl Default for WizardSettings {
    fn default() -> Self {
        Self {
            availability_poll_seconds: 30,
            progress_debounce_ms: 1000,
            progress_ttl_hours: 24,
            low_stock_threshold: 5,
            pricing: PricingSettings::default(),
        }
    }
}

impl WizardSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.availability_poll_seconds.max(1))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.progress_debounce_ms)
    }

    pub fn progress_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.progress_ttl_hours)
    }
}

/// Amounts are in minor units per participant.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PricingSettings {
    pub basic_insurance_cents: i32,
    pub comprehensive_insurance_cents: i32,
    pub deposit_percent: u32,
    pub installment_count: u32,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            basic_insurance_cents: 4_900,
            comprehensive_insurance_cents: 12_900,
            deposit_percent: 30,
            installment_count: 3,
        }
    }
}
