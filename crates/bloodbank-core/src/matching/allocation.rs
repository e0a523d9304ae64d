use std::cmp::Reverse;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::compatibility::CompatibilityMatrix;
use super::domain::{
    BloodGroup, FulfillmentRequest, InventoryLot, LotId, ProductClass, RequestId, RequestPriority,
    RequestStatus,
};

/// Units taken from one lot, with the lot count observed when the decision was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draw {
    pub lot_id: LotId,
    pub blood_group: BloodGroup,
    pub units: u32,
    pub lot_units_before: u32,
    pub expires_on: NaiveDate,
    pub match_score: i16,
}

/// Side-effect free plan for satisfying a request from a lot snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationDecision {
    pub request_id: RequestId,
    pub recipient_group: BloodGroup,
    pub product: ProductClass,
    pub priority: RequestPriority,
    pub status_before: RequestStatus,
    pub units_requested: u32,
    pub fulfilled_before: u32,
    pub draws: Vec<Draw>,
    pub residual: u32,
    pub evaluated_on: NaiveDate,
}

impl AllocationDecision {
    pub fn units_drawn(&self) -> u32 {
        self.draws.iter().map(|draw| draw.units).sum()
    }

    pub fn units_needed(&self) -> u32 {
        self.units_requested.saturating_sub(self.fulfilled_before)
    }

    pub fn is_satisfied(&self) -> bool {
        self.residual == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    #[error("request {0} is cancelled and cannot be allocated")]
    RequestClosed(RequestId),
}

/// Lots that may serve `request` on `as_of`, in draw order.
///
/// Order is earliest expiry first to limit wastage, then best match, then lot id.
pub fn candidate_lots<'a>(
    matrix: &CompatibilityMatrix,
    request: &FulfillmentRequest,
    lots: &'a [InventoryLot],
    as_of: NaiveDate,
) -> Vec<(&'a InventoryLot, i16)> {
    let mut candidates: Vec<(&InventoryLot, i16)> = lots
        .iter()
        .filter(|lot| lot.product == request.product && lot.is_usable(as_of))
        .filter(|lot| matrix.is_compatible(lot.blood_group, request.recipient_group, request.product))
        .map(|lot| {
            let score =
                matrix.match_priority(request.recipient_group, lot.blood_group, request.product);
            (lot, score)
        })
        .collect();

    candidates.sort_by(|(left, left_score), (right, right_score)| {
        (left.expires_on, Reverse(*left_score), &left.id).cmp(&(
            right.expires_on,
            Reverse(*right_score),
            &right.id,
        ))
    });

    candidates
}

pub fn allocate_with(
    matrix: &CompatibilityMatrix,
    request: &FulfillmentRequest,
    lots: &[InventoryLot],
    as_of: NaiveDate,
) -> Result<AllocationDecision, AllocationError> {
    if request.status == RequestStatus::Cancelled {
        return Err(AllocationError::RequestClosed(request.id.clone()));
    }

    let mut remaining = request.remaining();
    let mut draws = Vec::new();

    if remaining > 0 {
        for (lot, score) in candidate_lots(matrix, request, lots, as_of) {
            let units = lot.units.min(remaining);
            draws.push(Draw {
                lot_id: lot.id.clone(),
                blood_group: lot.blood_group,
                units,
                lot_units_before: lot.units,
                expires_on: lot.expires_on,
                match_score: score,
            });
            remaining -= units;
            if remaining == 0 {
                break;
            }
        }
    }

    Ok(AllocationDecision {
        request_id: request.id.clone(),
        recipient_group: request.recipient_group,
        product: request.product,
        priority: request.priority,
        status_before: request.status,
        units_requested: request.units_requested,
        fulfilled_before: request.units_fulfilled,
        draws,
        residual: remaining,
        evaluated_on: as_of,
    })
}

/// Plan draws for `request` against the standard compatibility tables. Does not touch `lots`.
pub fn allocate(
    request: &FulfillmentRequest,
    lots: &[InventoryLot],
    as_of: NaiveDate,
) -> Result<AllocationDecision, AllocationError> {
    allocate_with(&CompatibilityMatrix::STANDARD, request, lots, as_of)
}
