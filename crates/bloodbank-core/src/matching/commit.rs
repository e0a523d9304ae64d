use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::allocation::AllocationDecision;
use super::domain::{
    DonorId, InventoryLot, LotId, LotStatus, ProductClass, RequestId, RequestStatus,
};

/// State change the store must apply. Expected values let the store reject stale writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MutationOp {
    SetLotUnits {
        lot_id: LotId,
        expected_units: u32,
        new_units: u32,
    },
    SetLotStatus {
        lot_id: LotId,
        expected_status: LotStatus,
        new_status: LotStatus,
    },
    SetRequestProgress {
        request_id: RequestId,
        expected_fulfilled: u32,
        new_fulfilled: u32,
        new_status: RequestStatus,
    },
    ReceiveLot {
        lot: InventoryLot,
    },
    RecordDonation {
        donor_id: DonorId,
        expected_last_donation: Option<NaiveDate>,
        donated_on: NaiveDate,
        total_donations: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommitError {
    #[error("lot {lot_id} changed since the decision was made (expected {expected} units, found {found})")]
    ConcurrentModification {
        lot_id: LotId,
        expected: u32,
        found: u32,
    },
    #[error("lot {0} is no longer available for allocation")]
    LotUnavailable(LotId),
    #[error("lot {lot_id} holds {found} but the request is for {expected}")]
    IncompatibleProduct {
        lot_id: LotId,
        expected: ProductClass,
        found: ProductClass,
    },
}

/// Translate a decision into the lot decrements and request progress to persist together.
///
/// Nothing is emitted for a decision with no draws, leaving the request status untouched.
pub fn commit(decision: &AllocationDecision) -> Result<Vec<MutationOp>, CommitError> {
    let mut ops = Vec::with_capacity(decision.draws.len() + 1);

    for draw in &decision.draws {
        let new_units = draw.lot_units_before.checked_sub(draw.units).ok_or_else(|| {
            CommitError::ConcurrentModification {
                lot_id: draw.lot_id.clone(),
                expected: draw.units,
                found: draw.lot_units_before,
            }
        })?;

        ops.push(MutationOp::SetLotUnits {
            lot_id: draw.lot_id.clone(),
            expected_units: draw.lot_units_before,
            new_units,
        });
    }

    let drawn = decision.units_drawn();
    if drawn > 0 {
        let new_fulfilled = (decision.fulfilled_before + drawn).min(decision.units_requested);
        let new_status = if new_fulfilled == decision.units_requested {
            RequestStatus::Fulfilled
        } else {
            RequestStatus::PartiallyFulfilled
        };

        ops.push(MutationOp::SetRequestProgress {
            request_id: decision.request_id.clone(),
            expected_fulfilled: decision.fulfilled_before,
            new_fulfilled,
            new_status,
        });
    }

    Ok(ops)
}

/// Re-check that every drawn lot still matches the snapshot the decision was built from.
pub fn verify_snapshot(
    decision: &AllocationDecision,
    current: &[InventoryLot],
) -> Result<(), CommitError> {
    for draw in &decision.draws {
        let lot = current
            .iter()
            .find(|lot| lot.id == draw.lot_id)
            .ok_or_else(|| CommitError::LotUnavailable(draw.lot_id.clone()))?;

        if lot.product != decision.product {
            return Err(CommitError::IncompatibleProduct {
                lot_id: lot.id.clone(),
                expected: decision.product,
                found: lot.product,
            });
        }
        if !lot.is_usable(decision.evaluated_on) {
            return Err(CommitError::LotUnavailable(lot.id.clone()));
        }
        if lot.units != draw.lot_units_before {
            return Err(CommitError::ConcurrentModification {
                lot_id: lot.id.clone(),
                expected: draw.lot_units_before,
                found: lot.units,
            });
        }
    }

    Ok(())
}
