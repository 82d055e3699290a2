//! Admission policy

use parkgate_api::{Classification, ReservationRequest, Response};
use parkgate_util::Hour;
use serde::Serialize;
use std::fmt;

use crate::{OccupancyTable, find_earliest_block};

/// Why a request was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// Party larger than the hourly capacity
    ExceedsCapacity,
    /// Requested block ends after the last simulated hour
    OutOfRange,
    /// Requested hour already passed and nothing later fits
    LateNoSlot,
    /// Requested block is full and nothing later fits
    NoSlot,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DenyReason::ExceedsCapacity => "exceeds capacity",
            DenyReason::OutOfRange => "out of range",
            DenyReason::LateNoSlot => "late, no slot",
            DenyReason::NoSlot => "no slot in any window",
        };
        f.write_str(s)
    }
}

/// Outcome of classifying a request. Carries no side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Decision {
    Accepted { hour: Hour },
    Rescheduled { hour: Hour },
    LateRescheduled { hour: Hour },
    Denied { reason: DenyReason },
}

impl Decision {
    pub fn classification(&self) -> Classification {
        match self {
            Decision::Accepted { .. } => Classification::Accepted,
            Decision::Rescheduled { .. } => Classification::Rescheduled,
            Decision::LateRescheduled { .. } => Classification::LateRescheduled,
            Decision::Denied { .. } => Classification::Denied,
        }
    }

    /// Start of the assigned block, `None` when denied
    pub fn hour(&self) -> Option<Hour> {
        match self {
            Decision::Accepted { hour }
            | Decision::Rescheduled { hour }
            | Decision::LateRescheduled { hour } => Some(*hour),
            Decision::Denied { .. } => None,
        }
    }

    /// Build the reply sent back to the requester
    pub fn to_response(&self, request: &ReservationRequest) -> Response {
        let family = &request.family;
        match *self {
            Decision::Accepted { hour } => Response::new(
                Classification::Accepted,
                hour,
                format!("Reservation OK for family {} from {}:00 to {}:00", family, hour, hour + 2),
            ),
            Decision::Rescheduled { hour } => Response::new(
                Classification::Rescheduled,
                hour,
                format!(
                    "Hour {} is full; family {} rescheduled to {}:00-{}:00",
                    request.requested_hour,
                    family,
                    hour,
                    hour + 2
                ),
            ),
            Decision::LateRescheduled { hour } => Response::new(
                Classification::LateRescheduled,
                hour,
                format!(
                    "Hour {} has passed; family {} rescheduled to {}:00-{}:00",
                    request.requested_hour,
                    family,
                    hour,
                    hour + 2
                ),
            ),
            Decision::Denied { reason } => {
                Response::denied(format!("Reservation denied for family {}: {}", family, reason))
            }
        }
    }
}

/// Decide what to do with `request` given the table and the simulated hour.
///
/// Rules, first match wins:
/// 1. party larger than capacity: denied
/// 2. block would end after `hour_end`: denied
/// 3. requested hour already passed: earliest block from `current_hour`,
///    late-rescheduled, or denied
/// 4. requested block fits: accepted
/// 5. otherwise earliest block from `current_hour`, rescheduled, or denied
pub fn classify(table: &OccupancyTable, request: &ReservationRequest, current_hour: Hour) -> Decision {
    let params = table.params();
    let hour = request.requested_hour;
    let party = request.party_size;

    if party > params.capacity {
        return Decision::Denied {
            reason: DenyReason::ExceedsCapacity,
        };
    }

    if hour > params.hour_end || hour.saturating_add(1) > params.hour_end {
        return Decision::Denied {
            reason: DenyReason::OutOfRange,
        };
    }

    if hour < current_hour {
        return match find_earliest_block(table, party, current_hour) {
            Some(h) => Decision::LateRescheduled { hour: h },
            None => Decision::Denied {
                reason: DenyReason::LateNoSlot,
            },
        };
    }

    if table.fits(hour, party) {
        return Decision::Accepted { hour };
    }

    match find_earliest_block(table, party, current_hour) {
        Some(h) => Decision::Rescheduled { hour: h },
        None => Decision::Denied {
            reason: DenyReason::NoSlot,
        },
    }
}

/// Record the stay of an admitted party. Denied decisions change nothing.
pub fn apply(table: &mut OccupancyTable, decision: &Decision, party_size: u32) {
    if let Some(hour) = decision.hour() {
        table.add(hour, party_size);
        table.add(hour + 1, party_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimulationParams;

    fn table() -> OccupancyTable {
        OccupancyTable::new(SimulationParams::new(7, 19, 50).unwrap())
    }

    fn request(hour: Hour, party: u32) -> ReservationRequest {
        ReservationRequest {
            agent: "agent-1".into(),
            family: "Lopez".into(),
            reply_channel: "/tmp/agent-1.pipe".into(),
            requested_hour: hour,
            party_size: party,
        }
    }

    #[test]
    fn capacity_rule_comes_first() {
        let t = table();
        // Out of range and late as well, but capacity wins
        assert_eq!(
            classify(&t, &request(3, 51), 10),
            Decision::Denied {
                reason: DenyReason::ExceedsCapacity
            }
        );
    }

    #[test]
    fn out_of_range_denies_without_search() {
        let t = table();
        assert_eq!(
            classify(&t, &request(19, 1), 7),
            Decision::Denied {
                reason: DenyReason::OutOfRange
            }
        );
        assert_eq!(
            classify(&t, &request(i32::MAX, 1), 7),
            Decision::Denied {
                reason: DenyReason::OutOfRange
            }
        );
    }

    #[test]
    fn late_with_no_slot() {
        let mut t = table();
        for h in 12..=19 {
            t.add(h, 50);
        }
        assert_eq!(
            classify(&t, &request(8, 1), 12),
            Decision::Denied {
                reason: DenyReason::LateNoSlot
            }
        );
    }

    #[test]
    fn late_request_below_hour_start() {
        let t = table();
        assert_eq!(
            classify(&t, &request(2, 4), 7),
            Decision::LateRescheduled { hour: 7 }
        );
    }

    #[test]
    fn reschedule_searches_from_current_hour() {
        let mut t = table();
        t.add(12, 50);
        t.add(14, 50);
        // Block 10 is free, but the search starts at the current hour
        assert_eq!(
            classify(&t, &request(13, 1), 12),
            Decision::Rescheduled { hour: 15 }
        );
    }

    #[test]
    fn no_slot_anywhere() {
        let mut t = table();
        for h in 7..=19 {
            t.add(h, 45);
        }
        assert_eq!(
            classify(&t, &request(9, 6), 7),
            Decision::Denied {
                reason: DenyReason::NoSlot
            }
        );
    }

    #[test]
    fn apply_adds_to_both_hours_once() {
        let mut t = table();
        apply(&mut t, &Decision::Rescheduled { hour: 11 }, 7);
        assert_eq!(t.get(10), 0);
        assert_eq!(t.get(11), 7);
        assert_eq!(t.get(12), 7);
        assert_eq!(t.get(13), 0);
    }

    #[test]
    fn apply_denied_is_a_no_op() {
        let mut t = table();
        t.add(9, 3);
        let before: Vec<_> = t.iter().collect();
        apply(
            &mut t,
            &Decision::Denied {
                reason: DenyReason::NoSlot,
            },
            20,
        );
        assert_eq!(t.iter().collect::<Vec<_>>(), before);
    }

    #[test]
    fn response_text_and_sentinel() {
        let req = request(8, 10);
        let resp = Decision::Accepted { hour: 8 }.to_response(&req);
        assert_eq!(resp.classification, Classification::Accepted);
        assert_eq!(resp.assigned_hour, 8);
        assert_eq!(resp.message, "Reservation OK for family Lopez from 8:00 to 10:00");

        let resp = Decision::Denied {
            reason: DenyReason::OutOfRange,
        }
        .to_response(&req);
        assert_eq!(resp.assigned_hour, parkgate_api::NO_HOUR);
        assert!(resp.message.ends_with("out of range"));
    }
}
