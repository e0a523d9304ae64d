use serde::{Deserialize, Serialize};

use super::super::domain::{ProductClass, Sex};

/// Screening thresholds applied by the eligibility rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityConfig {
    pub minimum_age_years: u32,
    pub maximum_age_years: u32,
    pub minimum_weight_kg: f32,
    pub minimum_hemoglobin_male: f32,
    pub minimum_hemoglobin_female: f32,
    pub whole_blood_interval_days: u32,
    pub plasma_interval_days: u32,
    pub platelet_interval_days: u32,
}

impl EligibilityConfig {
    pub fn minimum_hemoglobin(&self, sex: Sex) -> f32 {
        match sex {
            Sex::Male => self.minimum_hemoglobin_male,
            Sex::Female => self.minimum_hemoglobin_female,
        }
    }

    /// Days that must pass after a donation before giving `product` again.
    pub fn interval_days(&self, product: ProductClass) -> u32 {
        match product {
            ProductClass::Plasma => self.plasma_interval_days,
            ProductClass::Platelets => self.platelet_interval_days,
            ProductClass::WholeBlood | ProductClass::RedCells | ProductClass::WhiteCells => {
                self.whole_blood_interval_days
            }
        }
    }
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            minimum_age_years: 18,
            maximum_age_years: 65,
            minimum_weight_kg: 50.0,
            minimum_hemoglobin_male: 13.0,
            minimum_hemoglobin_female: 12.5,
            whole_blood_interval_days: 56,
            plasma_interval_days: 28,
            platelet_interval_days: 7,
        }
    }
}
