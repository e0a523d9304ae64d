use std::io::Cursor;

use bloodbank_core::matching::{
    allocate, AlertKind, AlertMonitor, BloodGroup, FulfillmentRequest, ProductClass, RequestId,
    RequestPriority, RequestStatus,
};
use bloodbank_core::snapshot::{LotSnapshotImporter, SnapshotImportError};
use chrono::NaiveDate;

const SNAPSHOT: &str = "lot_id,blood_group,product,units,collected_on,expires_on,location,status
RC-1,O-,red_cells,3,2025-05-01,2025-06-12,Fridge 1,
RC-2,A+,red_cells,2,2025-05-20,2025-06-10,Fridge 1,
RC-3,A+,red_cells,12,2025-06-01,,Fridge 2,available
RC-4,B+,red_cells,6,2025-05-15,,Fridge 2,discarded
";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 10).expect("valid date")
}

#[test]
fn imported_snapshot_drives_allocation_and_alerts() {
    let lots = LotSnapshotImporter::from_reader(Cursor::new(SNAPSHOT)).expect("import");
    assert_eq!(lots.len(), 4);

    let request = FulfillmentRequest {
        id: RequestId("REQ-CSV".to_string()),
        recipient_group: BloodGroup::APositive,
        product: ProductClass::RedCells,
        units_requested: 4,
        units_fulfilled: 0,
        priority: RequestPriority::High,
        status: RequestStatus::Pending,
        requested_on: today(),
        required_by: None,
    };
    let decision = allocate(&request, &lots, today()).expect("allocate");

    // RC-2 expires today and RC-4 is discarded.
    let drawn: Vec<&str> = decision
        .draws
        .iter()
        .map(|draw| draw.lot_id.0.as_str())
        .collect();
    assert_eq!(drawn, vec!["RC-1", "RC-3"]);
    assert_eq!(decision.residual, 0);

    let alerts = AlertMonitor::default().scan(&lots, today());
    assert_eq!(alerts[0].kind, AlertKind::Expired);
    assert_eq!(alerts[0].lot_id.0, "RC-2");
    assert!(alerts
        .iter()
        .all(|alert| alert.lot_id.0 != "RC-4"));
}

#[test]
fn malformed_units_column_is_a_csv_error() {
    let csv = "lot_id,blood_group,product,units,collected_on\nRC-9,O-,red_cells,three,2025-05-01\n";

    match LotSnapshotImporter::from_reader(Cursor::new(csv)) {
        Err(SnapshotImportError::Csv(_)) => {}
        other => panic!("expected csv error, got {other:?}"),
    }
}

#[test]
fn drained_lots_import_but_are_never_drawn() {
    let csv = "lot_id,blood_group,product,units,collected_on,expires_on
L-1,O-,whole_blood,0,2025-05-20,2025-06-14
L-2,A+,whole_blood,6,2025-05-25,2025-06-30
";
    let lots = LotSnapshotImporter::from_reader(Cursor::new(csv)).expect("import");
    assert_eq!(lots.len(), 2);
    assert_eq!(lots[0].units, 0);

    let request = FulfillmentRequest {
        id: RequestId("REQ-DRAINED".to_string()),
        recipient_group: BloodGroup::APositive,
        product: ProductClass::WholeBlood,
        units_requested: 2,
        units_fulfilled: 0,
        priority: RequestPriority::Normal,
        status: RequestStatus::Pending,
        requested_on: today(),
        required_by: None,
    };
    let decision = allocate(&request, &lots, today()).expect("allocate");

    let drawn: Vec<&str> = decision
        .draws
        .iter()
        .map(|draw| draw.lot_id.0.as_str())
        .collect();
    assert_eq!(drawn, vec!["L-2"]);
    assert_eq!(decision.residual, 0);
}
