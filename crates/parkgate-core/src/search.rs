//! Earliest-fit block search

use parkgate_util::Hour;

use crate::OccupancyTable;

/// First hour at or after `from` where a party of `party_size` fits for a
/// whole two-hour block.
///
/// Scans `max(from, hour_start)..=hour_end - 1` in order and stops at the
/// first fit, so the result is the earliest feasible block, not the
/// emptiest one.
pub fn find_earliest_block(table: &OccupancyTable, party_size: u32, from: Hour) -> Option<Hour> {
    let params = table.params();
    let start = from.max(params.hour_start);
    (start..params.hour_end).find(|&h| table.fits(h, party_size))
}
