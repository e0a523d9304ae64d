//! Blood bank decision core: compatibility tables, donor screening, lot allocation and
//! stock alerts.
//!
//! Every decision function is pure and takes an explicit `as_of` date. Reads and writes go
//! through [`InventoryStore`]; the allocator only ever returns a plan, and [`commit`] turns
//! that plan into [`MutationOp`]s carrying the values they expect to overwrite.

pub mod alerts;
pub mod allocation;
pub mod commit;
pub mod compatibility;
pub mod domain;
pub mod eligibility;
pub(crate) mod intake;
pub mod repository;
pub mod scheduling;
pub mod service;

#[cfg(test)]
mod tests;

pub use alerts::{
    is_expired, is_expiring_soon, is_low_stock, stock_summary, AlertKind, AlertMonitor,
    AlertPolicy, StockAlert, StockLevel, EXPIRY_WARNING_DAYS, LOW_STOCK_THRESHOLD,
};
pub use allocation::{allocate, allocate_with, candidate_lots, AllocationDecision, AllocationError, Draw};
pub use commit::{commit, verify_snapshot, CommitError, MutationOp};
pub use compatibility::{
    check_labels, is_compatible, is_universal_donor, is_universal_plasma_donor,
    is_universal_recipient, match_priority, match_priority_for, validate_group,
    CompatibilityError, CompatibilityMatrix,
};
pub use domain::{
    AboType, BloodGroup, DonorId, DonorProfile, FulfillmentRequest, IncompatibleProduct,
    InvalidGroup, InventoryLot, LotId, LotStatus, MedicalCondition, PermanentCondition,
    ProductClass, RequestId, RequestPriority, RequestStatus, RhFactor, Sex, TemporaryCondition,
    DEFAULT_UNIT_VOLUME_ML,
};
pub use eligibility::{
    check_eligibility, EligibilityConfig, EligibilityEvaluator, EligibilityResult,
    IneligibilityReason,
};
pub use intake::{DonorSubmission, IntakeError, IntakeGuard, LotReceipt, RequestSubmission};
pub use repository::{InventoryStore, MemoryInventoryStore, StoreError};
pub use scheduling::schedule_requests;
pub use service::{BloodBankService, FulfillmentError, FulfillmentOutcome};
