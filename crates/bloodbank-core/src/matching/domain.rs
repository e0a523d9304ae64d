use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// ABO antigen group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AboType {
    O,
    A,
    B,
    AB,
}

impl AboType {
    pub const fn label(self) -> &'static str {
        match self {
            AboType::O => "O",
            AboType::A => "A",
            AboType::B => "B",
            AboType::AB => "AB",
        }
    }
}

/// Presence of the RhD antigen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RhFactor {
    Negative,
    Positive,
}

impl RhFactor {
    pub const fn sign(self) -> char {
        match self {
            RhFactor::Negative => '-',
            RhFactor::Positive => '+',
        }
    }
}

/// One of the eight ABO/Rh blood groups.
///
/// The discriminants index the constant compatibility tables, so the declaration order is
/// part of the contract with `compatibility`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BloodGroup {
    ONegative = 0,
    OPositive = 1,
    ANegative = 2,
    APositive = 3,
    BNegative = 4,
    BPositive = 5,
    AbNegative = 6,
    AbPositive = 7,
}

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::ONegative,
        BloodGroup::OPositive,
        BloodGroup::ANegative,
        BloodGroup::APositive,
        BloodGroup::BNegative,
        BloodGroup::BPositive,
        BloodGroup::AbNegative,
        BloodGroup::AbPositive,
    ];

    pub const fn abo(self) -> AboType {
        match self {
            BloodGroup::ONegative | BloodGroup::OPositive => AboType::O,
            BloodGroup::ANegative | BloodGroup::APositive => AboType::A,
            BloodGroup::BNegative | BloodGroup::BPositive => AboType::B,
            BloodGroup::AbNegative | BloodGroup::AbPositive => AboType::AB,
        }
    }

    pub const fn rh(self) -> RhFactor {
        match self {
            BloodGroup::ONegative
            | BloodGroup::ANegative
            | BloodGroup::BNegative
            | BloodGroup::AbNegative => RhFactor::Negative,
            _ => RhFactor::Positive,
        }
    }

    pub const fn is_rh_positive(self) -> bool {
        matches!(self.rh(), RhFactor::Positive)
    }

    pub const fn label(self) -> &'static str {
        match self {
            BloodGroup::ONegative => "O-",
            BloodGroup::OPositive => "O+",
            BloodGroup::ANegative => "A-",
            BloodGroup::APositive => "A+",
            BloodGroup::BNegative => "B-",
            BloodGroup::BPositive => "B+",
            BloodGroup::AbNegative => "AB-",
            BloodGroup::AbPositive => "AB+",
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BloodGroup {
    type Err = InvalidGroup;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().replace('\u{2212}', "-").to_ascii_uppercase();
        BloodGroup::ALL
            .into_iter()
            .find(|group| group.label() == normalized)
            .ok_or_else(|| InvalidGroup(raw.to_string()))
    }
}

impl TryFrom<String> for BloodGroup {
    type Error = InvalidGroup;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BloodGroup> for String {
    fn from(value: BloodGroup) -> Self {
        value.label().to_string()
    }
}

/// Raised whenever a blood-group string is outside the eight recognised values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid blood group '{0}': expected one of O-, O+, A-, A+, B-, B+, AB-, AB+")]
pub struct InvalidGroup(pub String);

/// Blood product classes handled by the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductClass {
    WholeBlood,
    Plasma,
    #[serde(alias = "platelet")]
    Platelets,
    #[serde(alias = "rbc")]
    RedCells,
    #[serde(alias = "wbc")]
    WhiteCells,
}

impl ProductClass {
    pub const ALL: [ProductClass; 5] = [
        ProductClass::WholeBlood,
        ProductClass::Plasma,
        ProductClass::Platelets,
        ProductClass::RedCells,
        ProductClass::WhiteCells,
    ];

    /// Days from collection until the product may no longer be issued.
    pub const fn shelf_life_days(self) -> i64 {
        match self {
            ProductClass::WholeBlood | ProductClass::RedCells => 42,
            ProductClass::Plasma => 365,
            ProductClass::Platelets => 5,
            ProductClass::WhiteCells => 1,
        }
    }

    /// Saturates at the last representable date.
    pub fn expiry_from(self, collected_on: NaiveDate) -> NaiveDate {
        collected_on
            .checked_add_days(Days::new(self.shelf_life_days().unsigned_abs()))
            .unwrap_or(NaiveDate::MAX)
    }

    pub const fn label(self) -> &'static str {
        match self {
            ProductClass::WholeBlood => "whole_blood",
            ProductClass::Plasma => "plasma",
            ProductClass::Platelets => "platelets",
            ProductClass::RedCells => "red_cells",
            ProductClass::WhiteCells => "white_cells",
        }
    }
}

impl fmt::Display for ProductClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProductClass {
    type Err = IncompatibleProduct;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "whole_blood" => Ok(ProductClass::WholeBlood),
            "plasma" => Ok(ProductClass::Plasma),
            "platelets" | "platelet" => Ok(ProductClass::Platelets),
            "red_cells" | "rbc" => Ok(ProductClass::RedCells),
            "white_cells" | "wbc" => Ok(ProductClass::WhiteCells),
            _ => Err(IncompatibleProduct(raw.to_string())),
        }
    }
}

/// Product label with no compatibility table behind it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no compatibility table defined for product '{0}'")]
pub struct IncompatibleProduct(pub String);

/// Identifier wrapper for stored lots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LotId(pub String);

impl fmt::Display for LotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LotStatus {
    Available,
    Reserved,
    Expired,
    Discarded,
}

impl LotStatus {
    pub const fn label(self) -> &'static str {
        match self {
            LotStatus::Available => "available",
            LotStatus::Reserved => "reserved",
            LotStatus::Expired => "expired",
            LotStatus::Discarded => "discarded",
        }
    }
}

pub const DEFAULT_UNIT_VOLUME_ML: u32 = 450;

/// One stored batch of a blood product with its own expiry and quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLot {
    pub id: LotId,
    pub blood_group: BloodGroup,
    pub product: ProductClass,
    pub units: u32,
    pub unit_volume_ml: u32,
    pub collected_on: NaiveDate,
    pub expires_on: NaiveDate,
    pub location: String,
    pub status: LotStatus,
}

impl InventoryLot {
    /// Build an available lot whose expiry is derived from the product shelf life.
    pub fn collected(
        id: LotId,
        blood_group: BloodGroup,
        product: ProductClass,
        units: u32,
        collected_on: NaiveDate,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id,
            blood_group,
            product,
            units,
            unit_volume_ml: DEFAULT_UNIT_VOLUME_ML,
            collected_on,
            expires_on: product.expiry_from(collected_on),
            location: location.into(),
            status: LotStatus::Available,
        }
    }

    /// Whether the lot may be counted as issuable stock on `as_of`.
    pub fn is_usable(&self, as_of: NaiveDate) -> bool {
        self.status == LotStatus::Available && self.units > 0 && self.expires_on > as_of
    }
}

/// Identifier wrapper for fulfillment requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Clinical urgency of a request. Ordered from least to most urgent.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RequestPriority {
    Low,
    #[default]
    Normal,
    High,
    Emergency,
}

impl RequestPriority {
    pub const fn label(self) -> &'static str {
        match self {
            RequestPriority::Low => "low",
            RequestPriority::Normal => "normal",
            RequestPriority::High => "high",
            RequestPriority::Emergency => "emergency",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    PartiallyFulfilled,
    Fulfilled,
    Cancelled,
}

impl RequestStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::PartiallyFulfilled => "partially_fulfilled",
            RequestStatus::Fulfilled => "fulfilled",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Fulfilled | RequestStatus::Cancelled)
    }
}

/// A recipient's outstanding demand for a blood product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentRequest {
    pub id: RequestId,
    pub recipient_group: BloodGroup,
    pub product: ProductClass,
    pub units_requested: u32,
    pub units_fulfilled: u32,
    pub priority: RequestPriority,
    pub status: RequestStatus,
    pub requested_on: NaiveDate,
    pub required_by: Option<NaiveDate>,
}

impl FulfillmentRequest {
    pub fn remaining(&self) -> u32 {
        self.units_requested.saturating_sub(self.units_fulfilled)
    }
}

/// Identifier wrapper for registered donors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DonorId(pub String);

impl fmt::Display for DonorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declared sex, used only to select the hemoglobin threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

/// Conditions that disqualify a donor for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermanentCondition {
    HivPositive,
    HepatitisB,
    HepatitisC,
    HeartDisease,
    CancerActive,
    BleedingDisorder,
    OrganTransplant,
}

impl PermanentCondition {
    pub const ALL: [PermanentCondition; 7] = [
        PermanentCondition::HivPositive,
        PermanentCondition::HepatitisB,
        PermanentCondition::HepatitisC,
        PermanentCondition::HeartDisease,
        PermanentCondition::CancerActive,
        PermanentCondition::BleedingDisorder,
        PermanentCondition::OrganTransplant,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            PermanentCondition::HivPositive => "hiv_positive",
            PermanentCondition::HepatitisB => "hepatitis_b",
            PermanentCondition::HepatitisC => "hepatitis_c",
            PermanentCondition::HeartDisease => "heart_disease",
            PermanentCondition::CancerActive => "cancer_active",
            PermanentCondition::BleedingDisorder => "bleeding_disorder",
            PermanentCondition::OrganTransplant => "organ_transplant",
        }
    }
}

/// Recent events that defer a donor for a fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporaryCondition {
    ColdFlu,
    Fever,
    Antibiotics,
    DentalProcedure,
    TattooPiercing,
    Vaccination,
    MinorSurgery,
    MajorSurgery,
    Pregnancy,
    BloodTransfusion,
}

impl TemporaryCondition {
    pub const ALL: [TemporaryCondition; 10] = [
        TemporaryCondition::ColdFlu,
        TemporaryCondition::Fever,
        TemporaryCondition::Antibiotics,
        TemporaryCondition::DentalProcedure,
        TemporaryCondition::TattooPiercing,
        TemporaryCondition::Vaccination,
        TemporaryCondition::MinorSurgery,
        TemporaryCondition::MajorSurgery,
        TemporaryCondition::Pregnancy,
        TemporaryCondition::BloodTransfusion,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            TemporaryCondition::ColdFlu => "cold_flu",
            TemporaryCondition::Fever => "fever",
            TemporaryCondition::Antibiotics => "antibiotics",
            TemporaryCondition::DentalProcedure => "dental_procedure",
            TemporaryCondition::TattooPiercing => "tattoo_piercing",
            TemporaryCondition::Vaccination => "vaccination",
            TemporaryCondition::MinorSurgery => "minor_surgery",
            TemporaryCondition::MajorSurgery => "major_surgery",
            TemporaryCondition::Pregnancy => "pregnancy",
            TemporaryCondition::BloodTransfusion => "blood_transfusion",
        }
    }
}

/// An active medical deferral recorded against a donor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MedicalCondition {
    Permanent(PermanentCondition),
    Temporary(TemporaryCondition),
    /// Clinician-entered deferral outside the standard catalogue.
    Custom { name: String, deferral_days: u32 },
}

impl MedicalCondition {
    pub fn label(&self) -> &str {
        match self {
            MedicalCondition::Permanent(condition) => condition.label(),
            MedicalCondition::Temporary(condition) => condition.label(),
            MedicalCondition::Custom { name, .. } => name,
        }
    }
}

impl FromStr for MedicalCondition {
    type Err = String;

    /// Parse a catalogue label. Custom deferrals carry a window and cannot be parsed from a name.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace([' ', '-'], "_");

        if let Some(condition) = PermanentCondition::ALL
            .into_iter()
            .find(|condition| condition.label() == normalized)
        {
            return Ok(MedicalCondition::Permanent(condition));
        }

        TemporaryCondition::ALL
            .into_iter()
            .find(|condition| condition.label() == normalized)
            .map(MedicalCondition::Temporary)
            .ok_or_else(|| raw.to_string())
    }
}

/// Biographical and medical snapshot used for donation eligibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorProfile {
    pub id: DonorId,
    pub blood_group: BloodGroup,
    pub birth_date: NaiveDate,
    pub weight_kg: f32,
    pub sex: Sex,
    pub hemoglobin_g_dl: f32,
    pub last_donation: Option<NaiveDate>,
    pub active: bool,
    pub conditions: Vec<MedicalCondition>,
    pub total_donations: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blood_group_parsing_is_case_insensitive_and_trims() {
        assert_eq!("ab-".parse::<BloodGroup>(), Ok(BloodGroup::AbNegative));
        assert_eq!(" o+ ".parse::<BloodGroup>(), Ok(BloodGroup::OPositive));
        assert_eq!("A\u{2212}".parse::<BloodGroup>(), Ok(BloodGroup::ANegative));
    }

    #[test]
    fn blood_group_parsing_rejects_unknown_values() {
        for raw in ["", "C+", "A", "AB", "O++", "0-", "A+ B"] {
            assert_eq!(
                raw.parse::<BloodGroup>(),
                Err(InvalidGroup(raw.to_string())),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn blood_group_serializes_as_label() {
        let json = serde_json::to_string(&BloodGroup::AbPositive).expect("serializes");
        assert_eq!(json, "\"AB+\"");
        let parsed: BloodGroup = serde_json::from_str("\"b-\"").expect("deserializes");
        assert_eq!(parsed, BloodGroup::BNegative);
        assert!(serde_json::from_str::<BloodGroup>("\"Q+\"").is_err());
    }

    #[test]
    fn shelf_life_drives_expiry() {
        let collected = NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date");
        assert_eq!(
            ProductClass::WholeBlood.expiry_from(collected),
            NaiveDate::from_ymd_opt(2025, 2, 12).expect("valid date")
        );
        assert_eq!(
            ProductClass::Platelets.expiry_from(collected),
            NaiveDate::from_ymd_opt(2025, 1, 6).expect("valid date")
        );
        assert_eq!(
            ProductClass::WhiteCells.expiry_from(collected),
            NaiveDate::from_ymd_opt(2025, 1, 2).expect("valid date")
        );
        assert_eq!(
            ProductClass::Plasma.expiry_from(collected),
            NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date")
        );
    }

    #[test]
    fn expiry_saturates_at_end_of_calendar() {
        let late = NaiveDate::MAX - chrono::Days::new(2);
        assert_eq!(ProductClass::Plasma.expiry_from(late), NaiveDate::MAX);
        assert_eq!(ProductClass::WhiteCells.expiry_from(NaiveDate::MAX), NaiveDate::MAX);
    }

    #[test]
    fn product_labels_accept_common_aliases() {
        assert_eq!("RBC".parse::<ProductClass>(), Ok(ProductClass::RedCells));
        assert_eq!("whole blood".parse::<ProductClass>(), Ok(ProductClass::WholeBlood));
        assert_eq!("platelet".parse::<ProductClass>(), Ok(ProductClass::Platelets));
        assert!("cryo".parse::<ProductClass>().is_err());
    }

    #[test]
    fn medical_conditions_parse_from_catalogue_labels() {
        assert_eq!(
            "HIV Positive".parse::<MedicalCondition>(),
            Ok(MedicalCondition::Permanent(PermanentCondition::HivPositive))
        );
        assert_eq!(
            "tattoo-piercing".parse::<MedicalCondition>(),
            Ok(MedicalCondition::Temporary(TemporaryCondition::TattooPiercing))
        );
        assert_eq!(
            "sunburn".parse::<MedicalCondition>(),
            Err("sunburn".to_string())
        );
    }

    #[test]
    fn priority_orders_by_urgency() {
        assert!(RequestPriority::Emergency > RequestPriority::High);
        assert!(RequestPriority::High > RequestPriority::Normal);
        assert!(RequestPriority::Normal > RequestPriority::Low);
    }
}
