//! FIFO order matcher tests
//!
//! An unordered outbound from the in-transit warehouse attaches to the
//! oldest purchase order still awaiting in-transit clearance. These
//! tests drive the pure selection function through the same
//! match-consume cycles the transfer service performs.

use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{select_fifo_candidate, FifoCandidate};
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn candidate(order_id: Uuid, pending: &str) -> FifoCandidate {
    FifoCandidate {
        order_id,
        in_transit_pending: dec(pending),
    }
}

/// Simulate the service loop: match, then consume the transferred
/// quantity from the matched candidate's pending amount.
fn match_and_consume(candidates: &mut [FifoCandidate], qty: Decimal) -> Option<Uuid> {
    let matched = select_fifo_candidate(candidates)?;
    if let Some(c) = candidates.iter_mut().find(|c| c.order_id == matched) {
        c.in_transit_pending -= qty;
    }
    Some(matched)
}

/// FIFO determinism: with two open orders both pending, the older one
/// is always chosen
#[test]
fn test_oldest_order_wins() {
    let o1 = Uuid::new_v4();
    let o2 = Uuid::new_v4();
    let candidates = vec![candidate(o1, "5"), candidate(o2, "5")];

    assert_eq!(select_fifo_candidate(&candidates), Some(o1));
}

/// FIFO exhaustion: once the older order's pending reaches zero, the
/// next unordered transfer attaches to the younger order
#[test]
fn test_exhausted_order_passes_to_next() {
    let o1 = Uuid::new_v4();
    let o2 = Uuid::new_v4();
    let mut candidates = vec![candidate(o1, "5"), candidate(o2, "5")];

    // two transfers of 3 and 2 drain O1
    assert_eq!(match_and_consume(&mut candidates, dec("3")), Some(o1));
    assert_eq!(match_and_consume(&mut candidates, dec("2")), Some(o1));
    // the third transfer lands on O2
    assert_eq!(match_and_consume(&mut candidates, dec("4")), Some(o2));
}

/// A partially drained order keeps matching until it is dry
#[test]
fn test_partial_consumption_keeps_matching() {
    let o1 = Uuid::new_v4();
    let o2 = Uuid::new_v4();
    let mut candidates = vec![candidate(o1, "10"), candidate(o2, "10")];

    for _ in 0..4 {
        assert_eq!(match_and_consume(&mut candidates, dec("2.5")), Some(o1));
    }
    assert_eq!(match_and_consume(&mut candidates, dec("1")), Some(o2));
}

/// No candidate is not an error: transfers outside the purchase-order
/// workflow proceed unattached
#[test]
fn test_no_open_order_yields_none() {
    assert_eq!(select_fifo_candidate(&[]), None);

    let all_cleared = vec![
        candidate(Uuid::new_v4(), "0"),
        candidate(Uuid::new_v4(), "0"),
    ];
    assert_eq!(select_fifo_candidate(&all_cleared), None);
}

/// Candidates whose pending went negative (ledger abuse) are skipped
/// like exhausted ones rather than matched
#[test]
fn test_negative_pending_never_matches() {
    let broken = Uuid::new_v4();
    let healthy = Uuid::new_v4();
    let candidates = vec![candidate(broken, "-2"), candidate(healthy, "1")];

    assert_eq!(select_fifo_candidate(&candidates), Some(healthy));
}

/// Serialized matching consumes at most the total pending amount:
/// replaying the transfers one at a time (as the per-material lock
/// forces) never double-attaches the same pending unit
#[test]
fn test_serialized_matching_respects_pending_totals() {
    let o1 = Uuid::new_v4();
    let mut candidates = vec![candidate(o1, "1")];

    // two transfers race for one pending unit; under the lock they run
    // in sequence, so only the first attaches
    assert_eq!(match_and_consume(&mut candidates, dec("1")), Some(o1));
    assert_eq!(match_and_consume(&mut candidates, dec("1")), None);
}
