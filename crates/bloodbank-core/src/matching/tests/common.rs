use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use chrono::{Duration, NaiveDate};

use crate::matching::commit::MutationOp;
use crate::matching::domain::{
    BloodGroup, DonorId, DonorProfile, FulfillmentRequest, InventoryLot, LotId, LotStatus,
    ProductClass, RequestId, RequestPriority, RequestStatus, Sex, DEFAULT_UNIT_VOLUME_ML,
};
use crate::matching::intake::{DonorSubmission, LotReceipt, RequestSubmission};
use crate::matching::repository::{InventoryStore, MemoryInventoryStore, StoreError};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn as_of() -> NaiveDate {
    date(2025, 3, 1)
}

pub(super) fn days_from_now(days: i64) -> NaiveDate {
    as_of() + Duration::days(days)
}

pub(super) fn lot(
    id: &str,
    group: BloodGroup,
    product: ProductClass,
    units: u32,
    expires_on: NaiveDate,
) -> InventoryLot {
    InventoryLot {
        id: LotId(id.to_string()),
        blood_group: group,
        product,
        units,
        unit_volume_ml: DEFAULT_UNIT_VOLUME_ML,
        collected_on: expires_on - Duration::days(product.shelf_life_days()),
        expires_on,
        location: "Cold room A".to_string(),
        status: LotStatus::Available,
    }
}

pub(super) fn whole_blood(id: &str, group: BloodGroup, units: u32, expires_in: i64) -> InventoryLot {
    lot(id, group, ProductClass::WholeBlood, units, days_from_now(expires_in))
}

/// Three lots from the A+ walkthrough: O-/10d, A+/3d and A+/40d.
pub(super) fn walkthrough_lots() -> Vec<InventoryLot> {
    vec![
        whole_blood("lot-o-neg-10d", BloodGroup::ONegative, 3, 10),
        whole_blood("lot-a-pos-3d", BloodGroup::APositive, 2, 3),
        whole_blood("lot-a-pos-40d", BloodGroup::APositive, 10, 40),
    ]
}

pub(super) fn request(
    id: &str,
    group: BloodGroup,
    product: ProductClass,
    units: u32,
) -> FulfillmentRequest {
    FulfillmentRequest {
        id: RequestId(id.to_string()),
        recipient_group: group,
        product,
        units_requested: units,
        units_fulfilled: 0,
        priority: RequestPriority::Normal,
        status: RequestStatus::Pending,
        requested_on: as_of(),
        required_by: None,
    }
}

pub(super) fn donor(id: &str, group: BloodGroup) -> DonorProfile {
    DonorProfile {
        id: DonorId(id.to_string()),
        blood_group: group,
        birth_date: date(1990, 5, 20),
        weight_kg: 72.0,
        sex: Sex::Male,
        hemoglobin_g_dl: 14.6,
        last_donation: None,
        active: true,
        conditions: Vec::new(),
        total_donations: 0,
    }
}

pub(super) fn lot_receipt(id: &str, group: &str, product: &str, units: u32) -> LotReceipt {
    LotReceipt {
        lot_id: id.to_string(),
        blood_group: group.to_string(),
        product: product.to_string(),
        units,
        collected_on: as_of(),
        expires_on: None,
        unit_volume_ml: None,
        location: " Shelf 4 ".to_string(),
    }
}

pub(super) fn request_submission(id: &str, group: &str, units: u32) -> RequestSubmission {
    RequestSubmission {
        request_id: id.to_string(),
        recipient_group: group.to_string(),
        product: "whole_blood".to_string(),
        units,
        priority: RequestPriority::High,
        requested_on: as_of(),
        required_by: Some(days_from_now(2)),
    }
}

pub(super) fn donor_submission(id: &str, group: &str) -> DonorSubmission {
    DonorSubmission {
        donor_id: id.to_string(),
        blood_group: group.to_string(),
        birth_date: date(1988, 11, 2),
        weight_kg: 64.5,
        sex: Sex::Female,
        hemoglobin_g_dl: 13.1,
        last_donation: None,
        active: true,
        conditions: Vec::new(),
        total_donations: 0,
    }
}

/// Store that rejects the first `conflicts` applies as if another committer got there first.
pub(super) struct ContendedStore {
    pub(super) inner: MemoryInventoryStore,
    conflicts: AtomicU32,
    pub(super) applies: AtomicU32,
    rival: Mutex<Option<Vec<MutationOp>>>,
}

impl ContendedStore {
    pub(super) fn new(inner: MemoryInventoryStore, conflicts: u32) -> Self {
        Self {
            inner,
            conflicts: AtomicU32::new(conflicts),
            applies: AtomicU32::new(0),
            rival: Mutex::new(None),
        }
    }

    /// Lands `rival` on the inner store just before the first apply goes through.
    pub(super) fn racing(inner: MemoryInventoryStore, rival: Vec<MutationOp>) -> Self {
        let store = Self::new(inner, 0);
        *store.rival.lock().expect("rival lock") = Some(rival);
        store
    }

    pub(super) fn apply_count(&self) -> u32 {
        self.applies.load(Ordering::SeqCst)
    }
}

impl InventoryStore for ContendedStore {
    fn lots(&self, product: ProductClass) -> Result<Vec<InventoryLot>, StoreError> {
        self.inner.lots(product)
    }

    fn all_lots(&self) -> Result<Vec<InventoryLot>, StoreError> {
        self.inner.all_lots()
    }

    fn insert_lot(&self, lot: InventoryLot) -> Result<(), StoreError> {
        self.inner.insert_lot(lot)
    }

    fn request(&self, id: &RequestId) -> Result<Option<FulfillmentRequest>, StoreError> {
        self.inner.request(id)
    }

    fn pending_requests(&self) -> Result<Vec<FulfillmentRequest>, StoreError> {
        self.inner.pending_requests()
    }

    fn insert_request(&self, request: FulfillmentRequest) -> Result<(), StoreError> {
        self.inner.insert_request(request)
    }

    fn donor(&self, id: &DonorId) -> Result<Option<DonorProfile>, StoreError> {
        self.inner.donor(id)
    }

    fn insert_donor(&self, donor: DonorProfile) -> Result<(), StoreError> {
        self.inner.insert_donor(donor)
    }

    fn apply(&self, ops: &[MutationOp]) -> Result<(), StoreError> {
        self.applies.fetch_add(1, Ordering::SeqCst);
        if let Some(rival) = self.rival.lock().expect("rival lock").take() {
            self.inner.apply(&rival)?;
        }
        let remaining = self.conflicts.load(Ordering::SeqCst);
        if remaining > 0 {
            self.conflicts.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Conflict("lot count moved underneath".to_string()));
        }
        self.inner.apply(ops)
    }
}
