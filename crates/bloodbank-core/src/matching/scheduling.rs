use std::cmp::{Ordering, Reverse};

use super::domain::FulfillmentRequest;

/// Order open requests for allocation: highest priority first, then earliest deadline,
/// then earliest submission. Requests without a deadline queue behind those with one.
pub fn schedule_requests(requests: &[FulfillmentRequest]) -> Vec<&FulfillmentRequest> {
    let mut open: Vec<&FulfillmentRequest> = requests
        .iter()
        .filter(|request| !request.status.is_terminal() && request.remaining() > 0)
        .collect();

    open.sort_by(|left, right| compare(left, right));
    open
}

fn compare(left: &FulfillmentRequest, right: &FulfillmentRequest) -> Ordering {
    Reverse(left.priority)
        .cmp(&Reverse(right.priority))
        .then_with(|| deadline_order(left, right))
        .then_with(|| left.requested_on.cmp(&right.requested_on))
        .then_with(|| left.id.cmp(&right.id))
}

fn deadline_order(left: &FulfillmentRequest, right: &FulfillmentRequest) -> Ordering {
    match (left.required_by, right.required_by) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
