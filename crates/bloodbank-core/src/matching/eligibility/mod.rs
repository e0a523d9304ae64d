mod config;
mod policy;
mod rules;
mod volume;

pub use config::EligibilityConfig;
pub use policy::{temporary_deferral_days, IneligibilityReason};
pub use volume::{can_safely_donate, estimate_blood_volume_litres, pounds_to_kg};

use chrono::NaiveDate;
use policy::decide_result;
use serde::{Deserialize, Serialize};

use super::domain::{DonorProfile, ProductClass};

/// Stateless evaluator that applies the screening thresholds to a donor snapshot.
#[derive(Debug, Clone, Default)]
pub struct EligibilityEvaluator {
    config: EligibilityConfig,
}

impl EligibilityEvaluator {
    pub fn new(config: EligibilityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EligibilityConfig {
        &self.config
    }

    pub fn check(
        &self,
        donor: &DonorProfile,
        product: ProductClass,
        as_of: NaiveDate,
    ) -> EligibilityResult {
        let trail = rules::evaluate_rules(donor, product, as_of, &self.config);
        decide_result(trail)
    }
}

/// Outcome of a donation screening, with every rule that failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub eligible: bool,
    pub reasons: Vec<IneligibilityReason>,
    pub next_eligible_date: Option<NaiveDate>,
}

impl EligibilityResult {
    pub fn is_permanently_deferred(&self) -> bool {
        self.reasons.iter().any(IneligibilityReason::is_permanent)
    }

    pub fn summary(&self) -> String {
        if self.eligible {
            return "eligible to donate".to_string();
        }

        let reasons = self
            .reasons
            .iter()
            .map(IneligibilityReason::summary)
            .collect::<Vec<_>>()
            .join("; ");
        match self.next_eligible_date {
            Some(date) => format!("not eligible: {reasons} (next eligible {date})"),
            None => format!("not eligible: {reasons}"),
        }
    }
}

/// Screen a donor against the standard thresholds.
pub fn check_eligibility(
    donor: &DonorProfile,
    product: ProductClass,
    as_of: NaiveDate,
) -> EligibilityResult {
    EligibilityEvaluator::default().check(donor, product, as_of)
}
