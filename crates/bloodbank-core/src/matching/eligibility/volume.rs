use super::super::domain::Sex;

pub const POUNDS_TO_KG: f32 = 0.453_592;
pub const STANDARD_DONATION_ML: f32 = 450.0;
pub const MAX_DONATION_FRACTION: f32 = 0.12;

pub fn pounds_to_kg(weight_lbs: f32) -> f32 {
    weight_lbs * POUNDS_TO_KG
}

/// Estimated circulating blood volume in litres (Nadler's equation).
pub fn estimate_blood_volume_litres(weight_kg: f32, height_cm: f32, sex: Sex) -> f32 {
    let height_m = height_cm / 100.0;
    match sex {
        Sex::Male => 0.3669 * height_m.powi(3) + 0.03219 * weight_kg + 0.6041,
        Sex::Female => 0.3561 * height_m.powi(3) + 0.03308 * weight_kg + 0.1833,
    }
}

/// A standard 450 mL draw must stay under 12% of the donor's blood volume.
pub fn can_safely_donate(weight_kg: f32, height_cm: f32, sex: Sex) -> bool {
    let volume_ml = estimate_blood_volume_litres(weight_kg, height_cm, sex) * 1000.0;
    volume_ml > 0.0 && STANDARD_DONATION_ML / volume_ml < MAX_DONATION_FRACTION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_pounds() {
        assert!((pounds_to_kg(110.0) - 49.895).abs() < 0.01);
    }

    #[test]
    fn typical_adult_can_donate_but_small_donor_cannot() {
        assert!(can_safely_donate(70.0, 175.0, Sex::Male));
        assert!(!can_safely_donate(30.0, 120.0, Sex::Female));
    }
}
