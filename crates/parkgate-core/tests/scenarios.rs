//! Admission scenarios over one simulated day
//!
//! Capacity 50, hours 7 to 19, clock starting at 7.

use parkgate_api::{Classification, NO_HOUR, ReservationRequest};
use parkgate_core::{Decision, DenyReason, ParkState, SimulationParams};
use parkgate_util::Hour;

fn park() -> ParkState {
    ParkState::new(SimulationParams::new(7, 19, 50).unwrap())
}

fn request(family: &str, hour: Hour, party: u32) -> ReservationRequest {
    ReservationRequest {
        agent: "agent-1".into(),
        family: family.into(),
        reply_channel: "/tmp/agent-1.pipe".into(),
        requested_hour: hour,
        party_size: party,
    }
}

#[test]
fn test_day_sequence() {
    let mut park = park();
    assert_eq!(park.current_hour(), 7);

    // Accepted at the requested hour
    let decision = park.admit(&request("Diaz", 8, 10)).unwrap();
    assert_eq!(decision, Decision::Accepted { hour: 8 });
    assert_eq!(park.occupancy().get(8), 10);
    assert_eq!(park.occupancy().get(9), 10);

    // 8 is too full for 45 more; 7..9 all touch a 10-count hour
    let decision = park.admit(&request("Perez", 8, 45)).unwrap();
    assert_eq!(decision, Decision::Rescheduled { hour: 10 });
    assert_eq!(park.occupancy().get(10), 45);
    assert_eq!(park.occupancy().get(11), 45);

    // Two hours later a request for 7 is late; 9 still has room
    park.advance_clock();
    park.advance_clock();
    assert_eq!(park.current_hour(), 9);
    let decision = park.admit(&request("Soto", 7, 5)).unwrap();
    assert_eq!(decision, Decision::LateRescheduled { hour: 9 });
    assert_eq!(park.occupancy().get(9), 15);
    assert_eq!(park.occupancy().get(10), 50);

    let stats = park.statistics();
    assert_eq!(stats.accepted, 1);
    assert_eq!(stats.rescheduled, 1);
    assert_eq!(stats.late_rescheduled, 1);
    assert_eq!(stats.denied, 0);
}

#[test]
fn test_oversized_party_denied_without_mutation() {
    let mut park = park();
    park.admit(&request("Diaz", 8, 10));
    let before: Vec<_> = park.occupancy().iter().collect();

    let req = request("Big", 10, 60);
    let decision = park.admit(&req).unwrap();
    assert_eq!(
        decision,
        Decision::Denied {
            reason: DenyReason::ExceedsCapacity
        }
    );
    assert_eq!(park.occupancy().iter().collect::<Vec<_>>(), before);

    let response = decision.to_response(&req);
    assert_eq!(response.classification, Classification::Denied);
    assert_eq!(response.assigned_hour, NO_HOUR);
    assert!(response.message.contains("exceeds capacity"));
}

#[test]
fn test_last_hour_is_out_of_range() {
    let mut park = park();
    let decision = park.admit(&request("Late", 19, 1)).unwrap();
    assert_eq!(
        decision,
        Decision::Denied {
            reason: DenyReason::OutOfRange
        }
    );
    assert_eq!(park.statistics().denied, 1);
}

#[test]
fn test_report_after_day() {
    let mut park = park();
    park.admit(&request("Diaz", 8, 10));
    park.admit(&request("Perez", 8, 45));
    while !park.is_finished() {
        park.advance_clock();
    }

    let report = park.report();
    assert_eq!(report.statistics.total(), 2);
    assert_eq!(report.peak.hours, vec![10, 11]);
    assert_eq!(report.peak.headcount, 45);
    assert_eq!(report.valley.headcount, 0);
    assert!(report.valley.hours.contains(&7));
    assert!(!report.valley.hours.contains(&8));
}
