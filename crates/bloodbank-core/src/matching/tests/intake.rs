use super::common::*;
use crate::matching::domain::{
    BloodGroup, InvalidGroup, LotStatus, MedicalCondition, ProductClass, RequestStatus,
    TemporaryCondition,
};
use crate::matching::intake::{IntakeError, IntakeGuard};

#[test]
fn receipt_derives_expiry_and_defaults() {
    let guard = IntakeGuard::default();

    let lot = guard
        .lot_from_receipt(lot_receipt(" L-100 ", "a+", "RBC", 6))
        .expect("valid receipt");

    assert_eq!(lot.id.0, "L-100");
    assert_eq!(lot.blood_group, BloodGroup::APositive);
    assert_eq!(lot.product, ProductClass::RedCells);
    assert_eq!(lot.expires_on, days_from_now(42));
    assert_eq!(lot.unit_volume_ml, 450);
    assert_eq!(lot.location, "Shelf 4");
    assert_eq!(lot.status, LotStatus::Available);
}

#[test]
fn receipt_keeps_explicit_expiry_and_volume() {
    let guard = IntakeGuard::new(300);
    let mut receipt = lot_receipt("L-101", "O-", "platelets", 2);
    receipt.expires_on = Some(days_from_now(3));

    let lot = guard.lot_from_receipt(receipt).expect("valid receipt");

    assert_eq!(lot.expires_on, days_from_now(3));
    assert_eq!(lot.unit_volume_ml, 300);
    assert_eq!(IntakeGuard::new(0).default_unit_volume_ml(), 450);
}

#[test]
fn receipt_rejections() {
    let guard = IntakeGuard::default();

    match guard.lot_from_receipt(lot_receipt("L-1", "A", "whole_blood", 1)) {
        Err(IntakeError::InvalidGroup(InvalidGroup(raw))) => assert_eq!(raw, "A"),
        other => panic!("expected invalid group, got {other:?}"),
    }
    match guard.lot_from_receipt(lot_receipt("L-1", "A+", "cryoprecipitate", 1)) {
        Err(IntakeError::IncompatibleProduct(_)) => {}
        other => panic!("expected incompatible product, got {other:?}"),
    }
    match guard.lot_from_receipt(lot_receipt("L-1", "A+", "plasma", 0)) {
        Err(IntakeError::ZeroUnits("units")) => {}
        other => panic!("expected zero units, got {other:?}"),
    }
    match guard.lot_from_receipt(lot_receipt("   ", "A+", "plasma", 1)) {
        Err(IntakeError::MissingIdentifier("lot_id")) => {}
        other => panic!("expected missing id, got {other:?}"),
    }

    let mut backwards = lot_receipt("L-2", "B+", "plasma", 1);
    backwards.expires_on = Some(days_from_now(-1));
    match guard.lot_from_receipt(backwards) {
        Err(IntakeError::ExpiryBeforeCollection { .. }) => {}
        other => panic!("expected expiry before collection, got {other:?}"),
    }
}

#[test]
fn snapshot_records_keep_drained_lots() {
    let guard = IntakeGuard::default();

    let lot = guard
        .lot_from_snapshot(lot_receipt("L-3", "O-", "whole_blood", 0))
        .expect("drained lot is a valid record");
    assert_eq!(lot.units, 0);
    assert!(!lot.is_usable(as_of()));

    match guard.lot_from_snapshot(lot_receipt("L-3", "O", "whole_blood", 0)) {
        Err(IntakeError::InvalidGroup(_)) => {}
        other => panic!("expected invalid group, got {other:?}"),
    }
}

#[test]
fn request_submission_becomes_pending_request() {
    let request = IntakeGuard::default()
        .request_from_submission(request_submission("R-1", "ab-", 3))
        .expect("valid request");

    assert_eq!(request.recipient_group, BloodGroup::AbNegative);
    assert_eq!(request.units_requested, 3);
    assert_eq!(request.units_fulfilled, 0);
    assert_eq!(request.status, RequestStatus::Pending);
}

#[test]
fn request_deadline_cannot_precede_submission() {
    let mut submission = request_submission("R-2", "O+", 1);
    submission.required_by = Some(days_from_now(-2));

    match IntakeGuard::default().request_from_submission(submission) {
        Err(IntakeError::DeadlineBeforeRequest { .. }) => {}
        other => panic!("expected deadline error, got {other:?}"),
    }
}

#[test]
fn donor_conditions_are_parsed_and_unknown_names_rejected() {
    let guard = IntakeGuard::default();

    let mut submission = donor_submission("D-1", "B-");
    submission.conditions = vec!["Cold Flu".to_string(), "tattoo-piercing".to_string()];
    let donor = guard.donor_from_submission(submission).expect("valid donor");
    assert_eq!(
        donor.conditions,
        vec![
            MedicalCondition::Temporary(TemporaryCondition::ColdFlu),
            MedicalCondition::Temporary(TemporaryCondition::TattooPiercing),
        ]
    );

    let mut submission = donor_submission("D-2", "B-");
    submission.conditions = vec!["sunburn".to_string()];
    match guard.donor_from_submission(submission) {
        Err(IntakeError::UnknownCondition(name)) => assert_eq!(name, "sunburn"),
        other => panic!("expected unknown condition, got {other:?}"),
    }
}

#[test]
fn donor_measurements_must_be_positive() {
    let mut submission = donor_submission("D-3", "O+");
    submission.hemoglobin_g_dl = f32::NAN;

    match IntakeGuard::default().donor_from_submission(submission) {
        Err(IntakeError::InvalidMeasurement {
            field: "hemoglobin_g_dl",
            ..
        }) => {}
        other => panic!("expected invalid measurement, got {other:?}"),
    }
}

#[test]
fn donor_submission_json_defaults() {
    let submission: crate::matching::intake::DonorSubmission = serde_json::from_str(
        r#"{"donor_id":"D-9","blood_group":"O-","birth_date":"1991-02-03","weight_kg":80.0,"sex":"male","hemoglobin_g_dl":15.2}"#,
    )
    .expect("valid json");

    assert!(submission.active);
    assert!(submission.conditions.is_empty());
    assert_eq!(submission.total_donations, 0);
}
