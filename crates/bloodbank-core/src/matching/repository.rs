use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::commit::MutationOp;
use super::domain::{
    DonorId, DonorProfile, FulfillmentRequest, InventoryLot, LotId, ProductClass, RequestId,
};

/// Storage abstraction so the fulfillment service can be exercised in isolation.
///
/// `apply` is all-or-nothing: every expected value is checked before any write lands.
pub trait InventoryStore: Send + Sync {
    fn lots(&self, product: ProductClass) -> Result<Vec<InventoryLot>, StoreError>;
    fn all_lots(&self) -> Result<Vec<InventoryLot>, StoreError>;
    fn insert_lot(&self, lot: InventoryLot) -> Result<(), StoreError>;
    fn request(&self, id: &RequestId) -> Result<Option<FulfillmentRequest>, StoreError>;
    fn pending_requests(&self) -> Result<Vec<FulfillmentRequest>, StoreError>;
    fn insert_request(&self, request: FulfillmentRequest) -> Result<(), StoreError>;
    fn donor(&self, id: &DonorId) -> Result<Option<DonorProfile>, StoreError>;
    fn insert_donor(&self, donor: DonorProfile) -> Result<(), StoreError>;
    fn apply(&self, ops: &[MutationOp]) -> Result<(), StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("stale write rejected: {0}")]
    Conflict(String),
    #[error("record already exists: {0}")]
    Duplicate(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Default)]
struct StoreState {
    lots: BTreeMap<LotId, InventoryLot>,
    requests: BTreeMap<RequestId, FulfillmentRequest>,
    donors: BTreeMap<DonorId, DonorProfile>,
}

/// Mutex-backed store. Applies are serialised, so at most one committer touches a lot at a time.
#[derive(Debug, Default)]
pub struct MemoryInventoryStore {
    state: Mutex<StoreState>,
}

impl MemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lots(lots: impl IntoIterator<Item = InventoryLot>) -> Self {
        let lots = lots.into_iter().map(|lot| (lot.id.clone(), lot)).collect();
        Self {
            state: Mutex::new(StoreState {
                lots,
                ..StoreState::default()
            }),
        }
    }

    pub fn lot(&self, id: &LotId) -> Result<Option<InventoryLot>, StoreError> {
        Ok(self.state()?.lots.get(id).cloned())
    }

    fn state(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("inventory store lock poisoned".to_string()))
    }
}

impl InventoryStore for MemoryInventoryStore {
    fn lots(&self, product: ProductClass) -> Result<Vec<InventoryLot>, StoreError> {
        Ok(self
            .state()?
            .lots
            .values()
            .filter(|lot| lot.product == product)
            .cloned()
            .collect())
    }

    fn all_lots(&self) -> Result<Vec<InventoryLot>, StoreError> {
        Ok(self.state()?.lots.values().cloned().collect())
    }

    fn insert_lot(&self, lot: InventoryLot) -> Result<(), StoreError> {
        let mut state = self.state()?;
        if state.lots.contains_key(&lot.id) {
            return Err(StoreError::Duplicate(format!("lot {}", lot.id)));
        }
        state.lots.insert(lot.id.clone(), lot);
        Ok(())
    }

    fn request(&self, id: &RequestId) -> Result<Option<FulfillmentRequest>, StoreError> {
        Ok(self.state()?.requests.get(id).cloned())
    }

    fn pending_requests(&self) -> Result<Vec<FulfillmentRequest>, StoreError> {
        Ok(self
            .state()?
            .requests
            .values()
            .filter(|request| !request.status.is_terminal())
            .cloned()
            .collect())
    }

    fn insert_request(&self, request: FulfillmentRequest) -> Result<(), StoreError> {
        let mut state = self.state()?;
        if state.requests.contains_key(&request.id) {
            return Err(StoreError::Duplicate(format!("request {}", request.id)));
        }
        state.requests.insert(request.id.clone(), request);
        Ok(())
    }

    fn donor(&self, id: &DonorId) -> Result<Option<DonorProfile>, StoreError> {
        Ok(self.state()?.donors.get(id).cloned())
    }

    fn insert_donor(&self, donor: DonorProfile) -> Result<(), StoreError> {
        let mut state = self.state()?;
        if state.donors.contains_key(&donor.id) {
            return Err(StoreError::Duplicate(format!("donor {}", donor.id)));
        }
        state.donors.insert(donor.id.clone(), donor);
        Ok(())
    }

    fn apply(&self, ops: &[MutationOp]) -> Result<(), StoreError> {
        let mut state = self.state()?;
        let mut staged = state.clone();
        for op in ops {
            apply_op(&mut staged, op)?;
        }
        *state = staged;
        Ok(())
    }
}

fn apply_op(state: &mut StoreState, op: &MutationOp) -> Result<(), StoreError> {
    match op {
        MutationOp::SetLotUnits {
            lot_id,
            expected_units,
            new_units,
        } => {
            let lot = state
                .lots
                .get_mut(lot_id)
                .ok_or_else(|| StoreError::NotFound(format!("lot {lot_id}")))?;
            if lot.units != *expected_units {
                return Err(StoreError::Conflict(format!(
                    "lot {lot_id} holds {} units, expected {expected_units}",
                    lot.units
                )));
            }
            lot.units = *new_units;
        }
        MutationOp::SetLotStatus {
            lot_id,
            expected_status,
            new_status,
        } => {
            let lot = state
                .lots
                .get_mut(lot_id)
                .ok_or_else(|| StoreError::NotFound(format!("lot {lot_id}")))?;
            if lot.status != *expected_status {
                return Err(StoreError::Conflict(format!(
                    "lot {lot_id} is {}, expected {}",
                    lot.status.label(),
                    expected_status.label()
                )));
            }
            lot.status = *new_status;
        }
        MutationOp::SetRequestProgress {
            request_id,
            expected_fulfilled,
            new_fulfilled,
            new_status,
        } => {
            let request = state
                .requests
                .get_mut(request_id)
                .ok_or_else(|| StoreError::NotFound(format!("request {request_id}")))?;
            if request.units_fulfilled != *expected_fulfilled {
                return Err(StoreError::Conflict(format!(
                    "request {request_id} has {} units fulfilled, expected {expected_fulfilled}",
                    request.units_fulfilled
                )));
            }
            request.units_fulfilled = *new_fulfilled;
            request.status = *new_status;
        }
        MutationOp::ReceiveLot { lot } => {
            if state.lots.contains_key(&lot.id) {
                return Err(StoreError::Duplicate(format!("lot {}", lot.id)));
            }
            state.lots.insert(lot.id.clone(), lot.clone());
        }
        MutationOp::RecordDonation {
            donor_id,
            expected_last_donation,
            donated_on,
            total_donations,
        } => {
            let donor = state
                .donors
                .get_mut(donor_id)
                .ok_or_else(|| StoreError::NotFound(format!("donor {donor_id}")))?;
            if donor.last_donation != *expected_last_donation {
                return Err(StoreError::Conflict(format!(
                    "donor {donor_id} donation history changed"
                )));
            }
            donor.last_donation = Some(*donated_on);
            donor.total_donations = *total_donations;
        }
    }

    Ok(())
}
