use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::alerts::{stock_summary, AlertMonitor, AlertPolicy, StockAlert, StockLevel};
use super::allocation::{allocate_with, AllocationDecision, AllocationError};
use super::commit::{commit, CommitError, MutationOp};
use super::compatibility::CompatibilityMatrix;
use super::domain::{
    BloodGroup, DonorId, DonorProfile, FulfillmentRequest, InventoryLot, LotId, ProductClass,
    RequestId, RequestStatus,
};
use super::eligibility::{EligibilityConfig, EligibilityEvaluator, EligibilityResult};
use super::intake::{DonorSubmission, IntakeError, IntakeGuard, LotReceipt, RequestSubmission};
use super::repository::{InventoryStore, StoreError};
use super::scheduling::schedule_requests;
use crate::config::{InventoryConfig, DEFAULT_COMMIT_MAX_ATTEMPTS};

/// Errors surfaced by the fulfillment service.
#[derive(Debug, thiserror::Error)]
pub enum FulfillmentError {
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    #[error(transparent)]
    Commit(#[from] CommitError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error("donor {donor_id} cannot donate: {summary}")]
    DonorIneligible { donor_id: DonorId, summary: String },
    #[error("donor {donor_id} is {donor} but the lot is labelled {lot}")]
    DonorGroupMismatch {
        donor_id: DonorId,
        donor: BloodGroup,
        lot: BloodGroup,
    },
    #[error("request {request_id} still conflicted after {attempts} commit attempts")]
    RetriesExhausted { request_id: RequestId, attempts: u32 },
}

/// Result of one committed fulfillment cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FulfillmentOutcome {
    pub decision: AllocationDecision,
    pub status: RequestStatus,
    pub attempts: u32,
}

/// Service composing the intake guard, store, allocator, eligibility rules and alert monitor.
pub struct BloodBankService<S> {
    store: Arc<S>,
    guard: Arc<IntakeGuard>,
    evaluator: Arc<EligibilityEvaluator>,
    monitor: AlertMonitor,
    matrix: CompatibilityMatrix,
    max_commit_attempts: u32,
}

impl<S> BloodBankService<S>
where
    S: InventoryStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::from_config(store, &InventoryConfig::default())
    }

    pub fn from_config(store: Arc<S>, config: &InventoryConfig) -> Self {
        Self::with_components(
            store,
            IntakeGuard::default(),
            EligibilityConfig::default(),
            config.alert_policy(),
            config.commit_max_attempts,
        )
    }

    pub fn with_components(
        store: Arc<S>,
        guard: IntakeGuard,
        eligibility: EligibilityConfig,
        policy: AlertPolicy,
        max_commit_attempts: u32,
    ) -> Self {
        let max_commit_attempts = if max_commit_attempts == 0 {
            DEFAULT_COMMIT_MAX_ATTEMPTS
        } else {
            max_commit_attempts
        };

        Self {
            store,
            guard: Arc::new(guard),
            evaluator: Arc::new(EligibilityEvaluator::new(eligibility)),
            monitor: AlertMonitor::new(policy),
            matrix: CompatibilityMatrix::STANDARD,
            max_commit_attempts,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn max_commit_attempts(&self) -> u32 {
        self.max_commit_attempts
    }

    pub fn receive_lot(&self, receipt: LotReceipt) -> Result<InventoryLot, FulfillmentError> {
        let lot = self.guard.lot_from_receipt(receipt)?;
        self.store.insert_lot(lot.clone())?;
        debug!(lot = %lot.id, group = %lot.blood_group, product = %lot.product, units = lot.units, "lot received");
        Ok(lot)
    }

    pub fn submit_request(
        &self,
        submission: RequestSubmission,
    ) -> Result<FulfillmentRequest, FulfillmentError> {
        let request = self.guard.request_from_submission(submission)?;
        self.store.insert_request(request.clone())?;
        debug!(request = %request.id, priority = request.priority.label(), "request queued");
        Ok(request)
    }

    pub fn register_donor(
        &self,
        submission: DonorSubmission,
    ) -> Result<DonorProfile, FulfillmentError> {
        let donor = self.guard.donor_from_submission(submission)?;
        self.store.insert_donor(donor.clone())?;
        Ok(donor)
    }

    pub fn check_donor(
        &self,
        donor_id: &DonorId,
        product: ProductClass,
        as_of: NaiveDate,
    ) -> Result<EligibilityResult, FulfillmentError> {
        let donor = self.fetch_donor(donor_id)?;
        Ok(self.evaluator.check(&donor, product, as_of))
    }

    /// Plan an allocation against current stock without writing anything.
    pub fn preview(
        &self,
        request_id: &RequestId,
        as_of: NaiveDate,
    ) -> Result<AllocationDecision, FulfillmentError> {
        let request = self.fetch_request(request_id)?;
        let lots = self.store.lots(request.product)?;
        Ok(allocate_with(&self.matrix, &request, &lots, as_of)?)
    }

    /// Run allocate, commit and apply for one request. A stale write rejected by the store
    /// restarts the whole cycle from a fresh read.
    pub fn fulfill(
        &self,
        request_id: &RequestId,
        as_of: NaiveDate,
    ) -> Result<FulfillmentOutcome, FulfillmentError> {
        for attempt in 1..=self.max_commit_attempts {
            let request = self.fetch_request(request_id)?;
            let lots = self.store.lots(request.product)?;
            let decision = allocate_with(&self.matrix, &request, &lots, as_of)?;
            debug!(
                request = %request_id,
                attempt,
                draws = decision.draws.len(),
                residual = decision.residual,
                "allocation planned"
            );

            let ops = commit(&decision)?;

            if ops.is_empty() {
                info!(request = %request_id, residual = decision.residual, "no compatible stock to draw");
                return Ok(FulfillmentOutcome {
                    status: decision.status_before,
                    decision,
                    attempts: attempt,
                });
            }

            match self.store.apply(&ops) {
                Ok(()) => {
                    let status = request_status_after(&ops, decision.status_before);
                    info!(
                        request = %request_id,
                        attempt,
                        units = decision.units_drawn(),
                        residual = decision.residual,
                        status = status.label(),
                        "fulfillment committed"
                    );
                    return Ok(FulfillmentOutcome {
                        decision,
                        status,
                        attempts: attempt,
                    });
                }
                Err(StoreError::Conflict(detail)) => {
                    warn!(request = %request_id, attempt, %detail, "commit conflicted, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(FulfillmentError::RetriesExhausted {
            request_id: request_id.clone(),
            attempts: self.max_commit_attempts,
        })
    }

    /// Fulfill every open request in priority order against shared stock.
    pub fn fulfill_pending(
        &self,
        as_of: NaiveDate,
    ) -> Result<Vec<FulfillmentOutcome>, FulfillmentError> {
        let pending = self.store.pending_requests()?;
        let order: Vec<RequestId> = schedule_requests(&pending)
            .into_iter()
            .map(|request| request.id.clone())
            .collect();

        order
            .iter()
            .map(|request_id| self.fulfill(request_id, as_of))
            .collect()
    }

    /// Mark every lot past its expiry date as expired, returning the lots moved.
    pub fn sweep_expired(&self, as_of: NaiveDate) -> Result<Vec<LotId>, FulfillmentError> {
        let lots = self.store.all_lots()?;
        let ops = self.monitor.expiry_transitions(&lots, as_of);
        if ops.is_empty() {
            return Ok(Vec::new());
        }

        self.store.apply(&ops)?;

        let expired: Vec<LotId> = ops
            .into_iter()
            .filter_map(|op| match op {
                MutationOp::SetLotStatus { lot_id, .. } => Some(lot_id),
                _ => None,
            })
            .collect();
        warn!(count = expired.len(), %as_of, "expired lots withdrawn from stock");
        Ok(expired)
    }

    /// Screen the donor, then store the collected lot and update donation history together.
    pub fn record_donation(
        &self,
        donor_id: &DonorId,
        receipt: LotReceipt,
    ) -> Result<InventoryLot, FulfillmentError> {
        let donor = self.fetch_donor(donor_id)?;
        let lot = self.guard.lot_from_receipt(receipt)?;

        if lot.blood_group != donor.blood_group {
            return Err(FulfillmentError::DonorGroupMismatch {
                donor_id: donor.id,
                donor: donor.blood_group,
                lot: lot.blood_group,
            });
        }

        let result = self.evaluator.check(&donor, lot.product, lot.collected_on);
        if !result.eligible {
            warn!(donor = %donor.id, reason = %result.summary(), "donation refused");
            return Err(FulfillmentError::DonorIneligible {
                donor_id: donor.id,
                summary: result.summary(),
            });
        }

        let ops = [
            MutationOp::ReceiveLot { lot: lot.clone() },
            MutationOp::RecordDonation {
                donor_id: donor.id.clone(),
                expected_last_donation: donor.last_donation,
                donated_on: lot.collected_on,
                total_donations: donor.total_donations + 1,
            },
        ];
        self.store.apply(&ops)?;

        info!(donor = %donor.id, lot = %lot.id, product = %lot.product, "donation recorded");
        Ok(lot)
    }

    pub fn alerts(&self, as_of: NaiveDate) -> Result<Vec<StockAlert>, FulfillmentError> {
        let lots = self.store.all_lots()?;
        Ok(self.monitor.scan(&lots, as_of))
    }

    pub fn stock(&self, as_of: NaiveDate) -> Result<Vec<StockLevel>, FulfillmentError> {
        let lots = self.store.all_lots()?;
        Ok(stock_summary(&lots, as_of))
    }

    fn fetch_request(&self, request_id: &RequestId) -> Result<FulfillmentRequest, StoreError> {
        self.store
            .request(request_id)?
            .ok_or_else(|| StoreError::NotFound(format!("request {request_id}")))
    }

    fn fetch_donor(&self, donor_id: &DonorId) -> Result<DonorProfile, StoreError> {
        self.store
            .donor(donor_id)?
            .ok_or_else(|| StoreError::NotFound(format!("donor {donor_id}")))
    }
}

fn request_status_after(ops: &[MutationOp], before: RequestStatus) -> RequestStatus {
    ops.iter()
        .find_map(|op| match op {
            MutationOp::SetRequestProgress { new_status, .. } => Some(*new_status),
            _ => None,
        })
        .unwrap_or(before)
}
