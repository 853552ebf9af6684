//! Distance Enrichment Pipeline.
//!
//! Route legs between adjacent agenda rows arrive out of band, after the
//! agenda is already displayed. Results are keyed by `(snapshot, day,
//! pair)` and patched into the existing slot; a result for a superseded
//! snapshot is silently discarded; pair indices are only valid for the
//! agenda build that produced them.

use crate::models::Coordinate;
use crate::repository::route::{RouteLeg, RouteProvider};
use crate::services::agenda::{AgendaRow, DayAgenda, SnapshotId};

/// Coordinate pair between two adjacent agenda rows, awaiting (or holding)
/// its route leg.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PairSlot {
    /// Index of the leading row of the pair within the agenda.
    pub pair_index: usize,
    pub from: Coordinate,
    pub to: Coordinate,
    pub leg: Option<RouteLeg>,
}

/// Compute the pair slots for a freshly built row sequence: every adjacent
/// pair where both rows expose a coordinate.
pub fn pair_slots(rows: &[AgendaRow]) -> Vec<PairSlot> {
    let mut slots = Vec::new();
    for (pair_index, pair) in rows.windows(2).enumerate() {
        if let (Some(from), Some(to)) = (pair[0].exit_coordinate(), pair[1].entry_coordinate()) {
            slots.push(PairSlot {
                pair_index,
                from,
                to,
                leg: None,
            });
        }
    }
    slots
}

/// An outstanding route request, tied to the agenda snapshot it was issued
/// for.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DistanceRequest {
    pub snapshot: SnapshotId,
    pub day_index: usize,
    pub pair_index: usize,
    pub from: Coordinate,
    pub to: Coordinate,
}

/// Delta published when one pair slot receives its leg.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DistanceUpdate {
    pub snapshot: SnapshotId,
    pub day_index: usize,
    pub pair_index: usize,
    pub leg: RouteLeg,
}

/// Requests for every slot of the agenda that has no leg yet.
pub fn pending_requests(agenda: &DayAgenda) -> Vec<DistanceRequest> {
    agenda
        .pair_slots
        .iter()
        .filter(|slot| slot.leg.is_none())
        .map(|slot| DistanceRequest {
            snapshot: agenda.snapshot,
            day_index: agenda.day_index,
            pair_index: slot.pair_index,
            from: slot.from,
            to: slot.to,
        })
        .collect()
}

/// Patch a completed leg into the agenda it was requested for.
///
/// Returns `false`, leaving the agenda untouched, when the request
/// belongs to a superseded snapshot, another day, or an unknown pair.
pub fn apply_to(agenda: &mut DayAgenda, request: &DistanceRequest, leg: RouteLeg) -> bool {
    if agenda.snapshot != request.snapshot || agenda.day_index != request.day_index {
        log::debug!(
            "Discarding stale distance result for snapshot {} pair {}",
            request.snapshot,
            request.pair_index
        );
        return false;
    }
    match agenda
        .pair_slots
        .iter_mut()
        .find(|slot| slot.pair_index == request.pair_index)
    {
        Some(slot) => {
            slot.leg = Some(leg);
            true
        }
        None => false,
    }
}

/// Resolve a batch of requests against the route provider. Failed legs are
/// warn-logged and skipped; distances are decorative, not load-bearing.
pub async fn fetch_legs(
    provider: &dyn RouteProvider,
    requests: &[DistanceRequest],
) -> Vec<(DistanceRequest, RouteLeg)> {
    let mut results = Vec::with_capacity(requests.len());
    for request in requests {
        match provider.route(&request.from, &request.to).await {
            Ok(leg) => results.push((request.clone(), leg)),
            Err(e) => {
                log::warn!("Route request for pair {} failed: {e}", request.pair_index);
            }
        }
    }
    results
}
