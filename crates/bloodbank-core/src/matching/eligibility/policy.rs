use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::super::domain::{ProductClass, TemporaryCondition};
use super::rules::RuleTrail;
use super::EligibilityResult;

/// Deferral window in days for each catalogued temporary condition.
pub const fn temporary_deferral_days(condition: TemporaryCondition) -> u32 {
    match condition {
        TemporaryCondition::ColdFlu => 7,
        TemporaryCondition::Fever => 14,
        TemporaryCondition::Antibiotics => 14,
        TemporaryCondition::DentalProcedure => 3,
        TemporaryCondition::TattooPiercing => 90,
        TemporaryCondition::Vaccination => 14,
        TemporaryCondition::MinorSurgery => 90,
        TemporaryCondition::MajorSurgery => 180,
        TemporaryCondition::Pregnancy => 180,
        TemporaryCondition::BloodTransfusion => 365,
    }
}

/// Why a donor may not give today. Each variant maps to one screening rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IneligibilityReason {
    InactiveDonor,
    BelowMinimumAge {
        age: u32,
        minimum: u32,
    },
    AboveMaximumAge {
        age: u32,
        maximum: u32,
    },
    Underweight {
        weight_kg: f32,
        minimum_kg: f32,
    },
    LowHemoglobin {
        measured: f32,
        minimum: f32,
    },
    DonationIntervalNotElapsed {
        product: ProductClass,
        days_since: i64,
        required_days: u32,
    },
    PermanentDeferral {
        condition: String,
    },
    TemporaryDeferral {
        condition: String,
        days: u32,
    },
}

impl IneligibilityReason {
    pub fn summary(&self) -> String {
        match self {
            IneligibilityReason::InactiveDonor => "donor is marked inactive".to_string(),
            IneligibilityReason::BelowMinimumAge { age, minimum } => {
                format!("must be at least {minimum} years old (current age: {age})")
            }
            IneligibilityReason::AboveMaximumAge { age, maximum } => {
                format!("maximum donation age is {maximum} years (current age: {age})")
            }
            IneligibilityReason::Underweight {
                weight_kg,
                minimum_kg,
            } => format!(
                "minimum weight is {:.1} kg (current: {:.1} kg)",
                minimum_kg, weight_kg
            ),
            IneligibilityReason::LowHemoglobin { measured, minimum } => format!(
                "hemoglobin too low: {:.1} g/dL (minimum: {:.1} g/dL)",
                measured, minimum
            ),
            IneligibilityReason::DonationIntervalNotElapsed {
                product,
                days_since,
                required_days,
            } => format!(
                "must wait {} more days since last {} donation",
                i64::from(*required_days) - days_since,
                product
            ),
            IneligibilityReason::PermanentDeferral { condition } => {
                format!("permanent deferral due to: {condition}")
            }
            IneligibilityReason::TemporaryDeferral { condition, days } => {
                format!("temporary deferral ({days} days) due to: {condition}")
            }
        }
    }

    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            IneligibilityReason::AboveMaximumAge { .. } | IneligibilityReason::PermanentDeferral { .. }
        )
    }
}

pub(crate) fn decide_result(trail: RuleTrail) -> EligibilityResult {
    let RuleTrail {
        reasons,
        proposed_date,
        permanent,
        open_ended,
    } = trail;

    let eligible = reasons.is_empty();
    let next_eligible_date: Option<NaiveDate> = if permanent || open_ended || eligible {
        None
    } else {
        proposed_date
    };

    EligibilityResult {
        eligible,
        reasons,
        next_eligible_date,
    }
}
