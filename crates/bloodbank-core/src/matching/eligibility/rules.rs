use chrono::{Datelike, Days, Months, NaiveDate};

use super::super::domain::{DonorProfile, MedicalCondition, ProductClass};
use super::config::EligibilityConfig;
use super::policy::{temporary_deferral_days, IneligibilityReason};

pub(crate) struct RuleTrail {
    pub reasons: Vec<IneligibilityReason>,
    pub proposed_date: Option<NaiveDate>,
    pub permanent: bool,
    /// Set when a deferral ends past the last representable date.
    pub open_ended: bool,
}

impl RuleTrail {
    fn new() -> Self {
        Self {
            reasons: Vec::new(),
            proposed_date: None,
            permanent: false,
            open_ended: false,
        }
    }

    fn propose(&mut self, date: NaiveDate) {
        self.proposed_date = Some(self.proposed_date.map_or(date, |current| current.max(date)));
    }

    fn propose_after(&mut self, from: NaiveDate, days: u32) {
        match from.checked_add_days(Days::new(u64::from(days))) {
            Some(date) => self.propose(date),
            None => self.open_ended = true,
        }
    }

    fn disqualify(mut self, reason: IneligibilityReason) -> Self {
        self.reasons.push(reason);
        self.permanent = true;
        self
    }
}

/// Whole calendar years between `birth_date` and `as_of`.
pub(crate) fn age_on(birth_date: NaiveDate, as_of: NaiveDate) -> u32 {
    let mut years = as_of.year() - birth_date.year();
    if (as_of.month(), as_of.day()) < (birth_date.month(), birth_date.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

fn birthday(birth_date: NaiveDate, years: u32) -> Option<NaiveDate> {
    birth_date.checked_add_months(Months::new(years.checked_mul(12)?))
}

/// Run every screening rule in order. Only permanent disqualifiers stop the walk early.
pub(crate) fn evaluate_rules(
    donor: &DonorProfile,
    product: ProductClass,
    as_of: NaiveDate,
    config: &EligibilityConfig,
) -> RuleTrail {
    let mut trail = RuleTrail::new();

    if !donor.active {
        trail.reasons.push(IneligibilityReason::InactiveDonor);
    }

    let age = age_on(donor.birth_date, as_of);
    if age < config.minimum_age_years {
        trail.reasons.push(IneligibilityReason::BelowMinimumAge {
            age,
            minimum: config.minimum_age_years,
        });
        if let Some(date) = birthday(donor.birth_date, config.minimum_age_years) {
            trail.propose(date);
        }
    } else if age > config.maximum_age_years {
        return trail.disqualify(IneligibilityReason::AboveMaximumAge {
            age,
            maximum: config.maximum_age_years,
        });
    }

    if donor.weight_kg < config.minimum_weight_kg {
        trail.reasons.push(IneligibilityReason::Underweight {
            weight_kg: donor.weight_kg,
            minimum_kg: config.minimum_weight_kg,
        });
    }

    let minimum_hemoglobin = config.minimum_hemoglobin(donor.sex);
    if donor.hemoglobin_g_dl < minimum_hemoglobin {
        trail.reasons.push(IneligibilityReason::LowHemoglobin {
            measured: donor.hemoglobin_g_dl,
            minimum: minimum_hemoglobin,
        });
    }

    if let Some(last_donation) = donor.last_donation {
        let required_days = config.interval_days(product);
        let days_since = (as_of - last_donation).num_days();
        if i64::from(required_days) - days_since > 0 {
            trail
                .reasons
                .push(IneligibilityReason::DonationIntervalNotElapsed {
                    product,
                    days_since,
                    required_days,
                });
            trail.propose_after(last_donation, required_days);
        }
    }

    for condition in &donor.conditions {
        let window = match condition {
            MedicalCondition::Permanent(permanent) => {
                return trail.disqualify(IneligibilityReason::PermanentDeferral {
                    condition: permanent.label().to_string(),
                });
            }
            MedicalCondition::Temporary(temporary) => temporary_deferral_days(*temporary),
            MedicalCondition::Custom { deferral_days, .. } => *deferral_days,
        };

        if window > 0 {
            trail.reasons.push(IneligibilityReason::TemporaryDeferral {
                condition: condition.label().to_string(),
                days: window,
            });
            trail.propose_after(as_of, window);
        }
    }

    trail
}
