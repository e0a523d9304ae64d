use super::common::*;
use crate::matching::domain::{BloodGroup, ProductClass, RequestPriority, RequestStatus};
use crate::matching::scheduling::schedule_requests;

#[test]
fn orders_by_priority_deadline_then_arrival() {
    let mut routine = request("r-routine", BloodGroup::OPositive, ProductClass::WholeBlood, 2);
    routine.priority = RequestPriority::Low;

    let mut urgent_late = request("r-urgent-late", BloodGroup::OPositive, ProductClass::WholeBlood, 2);
    urgent_late.priority = RequestPriority::High;
    urgent_late.required_by = Some(days_from_now(5));

    let mut urgent_soon = request("r-urgent-soon", BloodGroup::OPositive, ProductClass::WholeBlood, 2);
    urgent_soon.priority = RequestPriority::High;
    urgent_soon.required_by = Some(days_from_now(1));

    let mut urgent_open = request("r-urgent-open", BloodGroup::OPositive, ProductClass::WholeBlood, 2);
    urgent_open.priority = RequestPriority::High;

    let mut emergency = request("r-emergency", BloodGroup::OPositive, ProductClass::WholeBlood, 2);
    emergency.priority = RequestPriority::Emergency;
    emergency.requested_on = days_from_now(1);

    let mut normal_early = request("r-normal-early", BloodGroup::OPositive, ProductClass::WholeBlood, 2);
    normal_early.requested_on = days_from_now(-3);
    let normal_late = request("r-normal-late", BloodGroup::OPositive, ProductClass::WholeBlood, 2);

    let requests = vec![
        routine,
        normal_late,
        urgent_open,
        urgent_late,
        emergency,
        normal_early,
        urgent_soon,
    ];

    let order: Vec<&str> = schedule_requests(&requests)
        .into_iter()
        .map(|request| request.id.0.as_str())
        .collect();

    assert_eq!(
        order,
        vec![
            "r-emergency",
            "r-urgent-soon",
            "r-urgent-late",
            "r-urgent-open",
            "r-normal-early",
            "r-normal-late",
            "r-routine",
        ]
    );
}

#[test]
fn skips_closed_and_satisfied_requests() {
    let mut cancelled = request("r-cancelled", BloodGroup::APositive, ProductClass::Plasma, 2);
    cancelled.status = RequestStatus::Cancelled;
    let mut fulfilled = request("r-fulfilled", BloodGroup::APositive, ProductClass::Plasma, 2);
    fulfilled.status = RequestStatus::Fulfilled;
    fulfilled.units_fulfilled = 2;
    let mut partial = request("r-partial", BloodGroup::APositive, ProductClass::Plasma, 4);
    partial.status = RequestStatus::PartiallyFulfilled;
    partial.units_fulfilled = 1;

    let requests = vec![cancelled, fulfilled, partial];
    let scheduled = schedule_requests(&requests);

    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].id.0, "r-partial");
}
