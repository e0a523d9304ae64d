use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::commit::MutationOp;
use super::domain::{BloodGroup, InventoryLot, LotId, LotStatus, ProductClass};

pub const LOW_STOCK_THRESHOLD: u32 = 5;
pub const EXPIRY_WARNING_DAYS: u32 = 7;

/// Thresholds for stock warnings. Low stock is judged per lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertPolicy {
    pub low_stock_threshold: u32,
    pub expiry_warning_days: u32,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            low_stock_threshold: LOW_STOCK_THRESHOLD,
            expiry_warning_days: EXPIRY_WARNING_DAYS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Expired,
    ExpiringSoon,
    LowStock,
}

impl AlertKind {
    pub const fn label(self) -> &'static str {
        match self {
            AlertKind::Expired => "expired",
            AlertKind::ExpiringSoon => "expiring_soon",
            AlertKind::LowStock => "low_stock",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAlert {
    pub kind: AlertKind,
    pub lot_id: LotId,
    pub blood_group: BloodGroup,
    pub product: ProductClass,
    pub units: u32,
    pub expires_on: NaiveDate,
    pub message: String,
}

/// Usable units held for one blood group and product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub blood_group: BloodGroup,
    pub product: ProductClass,
    pub units: u32,
    pub lots: u32,
}

/// Derives warnings from a lot snapshot. Holds no state between scans.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertMonitor {
    policy: AlertPolicy,
}

impl AlertMonitor {
    pub fn new(policy: AlertPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> AlertPolicy {
        self.policy
    }

    /// A lot on its expiry date is already expired; it is never offered for allocation.
    pub fn is_expired(&self, lot: &InventoryLot, as_of: NaiveDate) -> bool {
        lot.expires_on <= as_of
    }

    /// A warning window reaching past the calendar covers every unexpired lot.
    pub fn is_expiring_soon(&self, lot: &InventoryLot, as_of: NaiveDate) -> bool {
        let within_window = as_of
            .checked_add_days(Days::new(u64::from(self.policy.expiry_warning_days)))
            .map_or(true, |horizon| lot.expires_on < horizon);
        !self.is_expired(lot, as_of) && within_window
    }

    pub fn is_low_stock(&self, lot: &InventoryLot) -> bool {
        lot.units < self.policy.low_stock_threshold
    }

    /// Every warning for the snapshot, most severe first, then by expiry and lot id.
    pub fn scan(&self, lots: &[InventoryLot], as_of: NaiveDate) -> Vec<StockAlert> {
        let mut alerts = Vec::new();

        for lot in lots {
            if lot.status == LotStatus::Discarded {
                continue;
            }

            if self.is_expired(lot, as_of) {
                alerts.push(alert(
                    AlertKind::Expired,
                    lot,
                    format!(
                        "expired: {} {} expired on {}",
                        lot.blood_group, lot.product, lot.expires_on
                    ),
                ));
                continue;
            }

            if lot.status != LotStatus::Available {
                continue;
            }

            if self.is_expiring_soon(lot, as_of) {
                alerts.push(alert(
                    AlertKind::ExpiringSoon,
                    lot,
                    format!(
                        "expiring soon: {} {} expires on {}",
                        lot.blood_group, lot.product, lot.expires_on
                    ),
                ));
            }

            if self.is_low_stock(lot) {
                alerts.push(alert(
                    AlertKind::LowStock,
                    lot,
                    format!(
                        "low stock: {} {} - only {} units left",
                        lot.blood_group, lot.product, lot.units
                    ),
                ));
            }
        }

        alerts.sort_by(|left, right| {
            (left.kind, left.expires_on, &left.lot_id).cmp(&(
                right.kind,
                right.expires_on,
                &right.lot_id,
            ))
        });
        alerts
    }

    /// Status changes moving past-expiry lots out of circulation.
    pub fn expiry_transitions(&self, lots: &[InventoryLot], as_of: NaiveDate) -> Vec<MutationOp> {
        lots.iter()
            .filter(|lot| matches!(lot.status, LotStatus::Available | LotStatus::Reserved))
            .filter(|lot| self.is_expired(lot, as_of))
            .map(|lot| MutationOp::SetLotStatus {
                lot_id: lot.id.clone(),
                expected_status: lot.status,
                new_status: LotStatus::Expired,
            })
            .collect()
    }
}

fn alert(kind: AlertKind, lot: &InventoryLot, message: String) -> StockAlert {
    StockAlert {
        kind,
        lot_id: lot.id.clone(),
        blood_group: lot.blood_group,
        product: lot.product,
        units: lot.units,
        expires_on: lot.expires_on,
        message,
    }
}

/// Usable units per blood group and product, in group then product order.
pub fn stock_summary(lots: &[InventoryLot], as_of: NaiveDate) -> Vec<StockLevel> {
    let mut levels: BTreeMap<(BloodGroup, ProductClass), StockLevel> = BTreeMap::new();

    for lot in lots.iter().filter(|lot| lot.is_usable(as_of)) {
        let level = levels
            .entry((lot.blood_group, lot.product))
            .or_insert(StockLevel {
                blood_group: lot.blood_group,
                product: lot.product,
                units: 0,
                lots: 0,
            });
        level.units += lot.units;
        level.lots += 1;
    }

    levels.into_values().collect()
}

pub fn is_expired(lot: &InventoryLot, as_of: NaiveDate) -> bool {
    AlertMonitor::default().is_expired(lot, as_of)
}

pub fn is_expiring_soon(lot: &InventoryLot, as_of: NaiveDate) -> bool {
    AlertMonitor::default().is_expiring_soon(lot, as_of)
}

pub fn is_low_stock(lot: &InventoryLot) -> bool {
    AlertMonitor::default().is_low_stock(lot)
}
