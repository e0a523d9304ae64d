use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    BloodGroup, DonorId, DonorProfile, FulfillmentRequest, IncompatibleProduct, InvalidGroup,
    InventoryLot, LotId, LotStatus, MedicalCondition, ProductClass, RequestId, RequestPriority,
    RequestStatus, Sex, DEFAULT_UNIT_VOLUME_ML,
};

/// Validation errors raised by the intake guard.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntakeError {
    #[error(transparent)]
    InvalidGroup(#[from] InvalidGroup),
    #[error(transparent)]
    IncompatibleProduct(#[from] IncompatibleProduct),
    #[error("unknown medical condition '{0}'")]
    UnknownCondition(String),
    #[error("{0} must not be blank")]
    MissingIdentifier(&'static str),
    #[error("{0} must be at least one unit")]
    ZeroUnits(&'static str),
    #[error("lot expires on {expires_on} but was collected on {collected_on}")]
    ExpiryBeforeCollection {
        collected_on: NaiveDate,
        expires_on: NaiveDate,
    },
    #[error("required-by date {required_by} precedes request date {requested_on}")]
    DeadlineBeforeRequest {
        requested_on: NaiveDate,
        required_by: NaiveDate,
    },
    #[error("{field} must be a positive number (found {value})")]
    InvalidMeasurement { field: &'static str, value: f32 },
}

/// Raw lot receipt as typed at the bench or exported from a stock list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotReceipt {
    pub lot_id: String,
    pub blood_group: String,
    pub product: String,
    pub units: u32,
    pub collected_on: NaiveDate,
    #[serde(default)]
    pub expires_on: Option<NaiveDate>,
    #[serde(default)]
    pub unit_volume_ml: Option<u32>,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSubmission {
    pub request_id: String,
    pub recipient_group: String,
    pub product: String,
    pub units: u32,
    #[serde(default)]
    pub priority: RequestPriority,
    pub requested_on: NaiveDate,
    #[serde(default)]
    pub required_by: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorSubmission {
    pub donor_id: String,
    pub blood_group: String,
    pub birth_date: NaiveDate,
    pub weight_kg: f32,
    pub sex: Sex,
    pub hemoglobin_g_dl: f32,
    #[serde(default)]
    pub last_donation: Option<NaiveDate>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub total_donations: u32,
}

fn default_active() -> bool {
    true
}

/// Guard responsible for turning raw submissions into typed records.
#[derive(Debug, Clone)]
pub struct IntakeGuard {
    default_unit_volume_ml: u32,
}

impl Default for IntakeGuard {
    fn default() -> Self {
        Self::new(DEFAULT_UNIT_VOLUME_ML)
    }
}

impl IntakeGuard {
    pub fn new(default_unit_volume_ml: u32) -> Self {
        let sanitized = if default_unit_volume_ml > 0 {
            default_unit_volume_ml
        } else {
            DEFAULT_UNIT_VOLUME_ML
        };

        Self {
            default_unit_volume_ml: sanitized,
        }
    }

    pub fn default_unit_volume_ml(&self) -> u32 {
        self.default_unit_volume_ml
    }

    /// Validate a receipt into an available lot. Expiry defaults to the product shelf life.
    pub fn lot_from_receipt(&self, receipt: LotReceipt) -> Result<InventoryLot, IntakeError> {
        if receipt.units == 0 {
            return Err(IntakeError::ZeroUnits("units"));
        }
        self.lot_from_record(receipt)
    }

    /// Validate an exported stock record. Drained lots keep their zero unit count.
    pub fn lot_from_snapshot(&self, receipt: LotReceipt) -> Result<InventoryLot, IntakeError> {
        self.lot_from_record(receipt)
    }

    fn lot_from_record(&self, receipt: LotReceipt) -> Result<InventoryLot, IntakeError> {
        let lot_id = required(receipt.lot_id, "lot_id")?;
        let blood_group: BloodGroup = receipt.blood_group.parse()?;
        let product: ProductClass = receipt.product.parse()?;

        let expires_on = receipt
            .expires_on
            .unwrap_or_else(|| product.expiry_from(receipt.collected_on));
        if expires_on < receipt.collected_on {
            return Err(IntakeError::ExpiryBeforeCollection {
                collected_on: receipt.collected_on,
                expires_on,
            });
        }

        Ok(InventoryLot {
            id: LotId(lot_id),
            blood_group,
            product,
            units: receipt.units,
            unit_volume_ml: receipt
                .unit_volume_ml
                .filter(|volume| *volume > 0)
                .unwrap_or(self.default_unit_volume_ml),
            collected_on: receipt.collected_on,
            expires_on,
            location: receipt.location.trim().to_string(),
            status: LotStatus::Available,
        })
    }

    pub fn request_from_submission(
        &self,
        submission: RequestSubmission,
    ) -> Result<FulfillmentRequest, IntakeError> {
        let request_id = required(submission.request_id, "request_id")?;
        let recipient_group: BloodGroup = submission.recipient_group.parse()?;
        let product: ProductClass = submission.product.parse()?;

        if submission.units == 0 {
            return Err(IntakeError::ZeroUnits("units"));
        }

        if let Some(required_by) = submission.required_by {
            if required_by < submission.requested_on {
                return Err(IntakeError::DeadlineBeforeRequest {
                    requested_on: submission.requested_on,
                    required_by,
                });
            }
        }

        Ok(FulfillmentRequest {
            id: RequestId(request_id),
            recipient_group,
            product,
            units_requested: submission.units,
            units_fulfilled: 0,
            priority: submission.priority,
            status: RequestStatus::Pending,
            requested_on: submission.requested_on,
            required_by: submission.required_by,
        })
    }

    /// Validate a donor record. Unrecognised condition names are rejected, never dropped.
    pub fn donor_from_submission(
        &self,
        submission: DonorSubmission,
    ) -> Result<DonorProfile, IntakeError> {
        let donor_id = required(submission.donor_id, "donor_id")?;
        let blood_group: BloodGroup = submission.blood_group.parse()?;

        positive(submission.weight_kg, "weight_kg")?;
        positive(submission.hemoglobin_g_dl, "hemoglobin_g_dl")?;

        let conditions = submission
            .conditions
            .iter()
            .map(|raw| {
                raw.parse::<MedicalCondition>()
                    .map_err(IntakeError::UnknownCondition)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DonorProfile {
            id: DonorId(donor_id),
            blood_group,
            birth_date: submission.birth_date,
            weight_kg: submission.weight_kg,
            sex: submission.sex,
            hemoglobin_g_dl: submission.hemoglobin_g_dl,
            last_donation: submission.last_donation,
            active: submission.active,
            conditions,
            total_donations: submission.total_donations,
        })
    }
}

fn required(raw: String, field: &'static str) -> Result<String, IntakeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(IntakeError::MissingIdentifier(field));
    }
    Ok(trimmed.to_string())
}

fn positive(value: f32, field: &'static str) -> Result<(), IntakeError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(IntakeError::InvalidMeasurement { field, value })
    }
}
