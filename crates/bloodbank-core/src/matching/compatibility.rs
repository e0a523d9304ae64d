use super::domain::{AboType, BloodGroup, IncompatibleProduct, InvalidGroup, ProductClass};

type Table = [[bool; 8]; 8];

const T: bool = true;
const F: bool = false;

// Rows are donors, columns recipients, both in `BloodGroup::ALL` order:
// O-, O+, A-, A+, B-, B+, AB-, AB+.
const RED_CELL: Table = [
    [T, T, T, T, T, T, T, T],
    [F, T, F, T, F, T, F, T],
    [F, F, T, T, F, F, T, T],
    [F, F, F, T, F, F, F, T],
    [F, F, F, F, T, T, T, T],
    [F, F, F, F, F, T, F, T],
    [F, F, F, F, F, F, T, T],
    [F, F, F, F, F, F, F, T],
];

// Plasma carries antibodies rather than antigens, so AB gives to everyone and O only to O.
const PLASMA: Table = [
    [T, F, F, F, F, F, F, F],
    [T, T, F, F, F, F, F, F],
    [T, F, T, F, F, F, F, F],
    [T, T, T, T, F, F, F, F],
    [T, F, F, F, T, F, F, F],
    [T, T, F, F, T, T, F, F],
    [T, F, T, F, T, F, T, F],
    [T, T, T, T, T, T, T, T],
];

pub const INCOMPATIBLE_SCORE: i16 = -1;
pub const IDENTICAL_GROUP_SCORE: i16 = 100;
pub const SAME_ABO_SCORE: i16 = 75;
pub const UNIVERSAL_DONOR_SCORE: i16 = 50;
pub const OTHER_COMPATIBLE_SCORE: i16 = 25;

/// Immutable donor/recipient lookup tables for red-cell style products and plasma.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityMatrix {
    red_cell: Table,
    plasma: Table,
}

impl CompatibilityMatrix {
    pub const STANDARD: CompatibilityMatrix = CompatibilityMatrix {
        red_cell: RED_CELL,
        plasma: PLASMA,
    };

    fn table(&self, product: ProductClass) -> &Table {
        match product {
            ProductClass::Plasma => &self.plasma,
            ProductClass::WholeBlood
            | ProductClass::RedCells
            | ProductClass::Platelets
            | ProductClass::WhiteCells => &self.red_cell,
        }
    }

    pub fn is_compatible(
        &self,
        donor: BloodGroup,
        recipient: BloodGroup,
        product: ProductClass,
    ) -> bool {
        self.table(product)[donor.index()][recipient.index()]
    }

    /// Donor groups a recipient may receive `product` from, in `BloodGroup::ALL` order.
    pub fn compatible_donors(&self, recipient: BloodGroup, product: ProductClass) -> Vec<BloodGroup> {
        BloodGroup::ALL
            .into_iter()
            .filter(|donor| self.is_compatible(*donor, recipient, product))
            .collect()
    }

    /// Recipient groups that may receive `product` from a donor.
    pub fn compatible_recipients(&self, donor: BloodGroup, product: ProductClass) -> Vec<BloodGroup> {
        BloodGroup::ALL
            .into_iter()
            .filter(|recipient| self.is_compatible(donor, *recipient, product))
            .collect()
    }

    /// Match quality of a donor for a recipient under the product's table.
    ///
    /// The universal-donor bonus goes to the ABO type that can give to every recipient under
    /// that table: O for red-cell style products, AB for plasma.
    pub fn match_priority(
        &self,
        recipient: BloodGroup,
        donor: BloodGroup,
        product: ProductClass,
    ) -> i16 {
        if !self.is_compatible(donor, recipient, product) {
            return INCOMPATIBLE_SCORE;
        }
        if recipient == donor {
            return IDENTICAL_GROUP_SCORE;
        }
        if recipient.abo() == donor.abo() {
            return SAME_ABO_SCORE;
        }

        let universal_abo = match product {
            ProductClass::Plasma => AboType::AB,
            _ => AboType::O,
        };
        if donor.abo() == universal_abo {
            UNIVERSAL_DONOR_SCORE
        } else {
            OTHER_COMPATIBLE_SCORE
        }
    }
}

impl Default for CompatibilityMatrix {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Errors raised when compatibility is queried with raw labels.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompatibilityError {
    #[error(transparent)]
    InvalidGroup(#[from] InvalidGroup),
    #[error(transparent)]
    IncompatibleProduct(#[from] IncompatibleProduct),
}

pub fn validate_group(raw: &str) -> Result<BloodGroup, InvalidGroup> {
    raw.parse()
}

pub fn is_compatible(donor: BloodGroup, recipient: BloodGroup, product: ProductClass) -> bool {
    CompatibilityMatrix::STANDARD.is_compatible(donor, recipient, product)
}

/// Red-cell match quality: -1 incompatible, 100 identical, 75 same ABO, 50 O donor, 25 other.
pub fn match_priority(recipient: BloodGroup, donor: BloodGroup) -> i16 {
    CompatibilityMatrix::STANDARD.match_priority(recipient, donor, ProductClass::RedCells)
}

pub fn match_priority_for(recipient: BloodGroup, donor: BloodGroup, product: ProductClass) -> i16 {
    CompatibilityMatrix::STANDARD.match_priority(recipient, donor, product)
}

/// Boundary entry point for callers holding unvalidated labels.
pub fn check_labels(donor: &str, recipient: &str, product: &str) -> Result<bool, CompatibilityError> {
    let donor = validate_group(donor)?;
    let recipient = validate_group(recipient)?;
    let product: ProductClass = product.parse()?;
    Ok(is_compatible(donor, recipient, product))
}

pub fn is_universal_donor(group: BloodGroup) -> bool {
    group == BloodGroup::ONegative
}

pub fn is_universal_recipient(group: BloodGroup) -> bool {
    group == BloodGroup::AbPositive
}

/// AB+ plasma is accepted by every recipient under the plasma table.
pub fn is_universal_plasma_donor(group: BloodGroup) -> bool {
    group == BloodGroup::AbPositive
}
