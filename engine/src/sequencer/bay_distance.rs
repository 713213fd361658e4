//! Bay-distance sequencing
//!
//! Bays are visited in path order over every path of the facility, and each
//! bay's tiers in working order. A tier takes every remaining task located in
//! it (the tier itself or a slot below it), in pre-sort order.

use sdk::types::{LocationId, Task};
use sdk::Topology;
use std::collections::HashSet;

use super::presort::pre_sort;
use super::{nulls_last, Sequenced};

/// Which tiers of each bay a traversal pass visits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TierPass {
    All,
    /// Every tier except the first (top) one
    BelowTop,
    /// Only the first (top) tier
    TopOnly,
}

impl TierPass {
    fn visits(self, tier_index: usize) -> bool {
        match self {
            Self::All => true,
            Self::BelowTop => tier_index > 0,
            Self::TopOnly => tier_index == 0,
        }
    }
}

/// Sort by bay then tier
pub fn sort<T: Topology + ?Sized>(topology: &T, tasks: Vec<Task>) -> Sequenced {
    let mut pool = pre_sort(tasks);
    let ordered = place_by_tier(topology, &mut pool, TierPass::All);
    finish(ordered, pool)
}

/// Sort by bay then tier, with all top-tier work last
///
/// Preferred sequence orders tasks within each pass only, so no top-tier
/// task ever moves ahead of lower-tier work. Unmatched tasks that carry a
/// preferred sequence follow both passes.
pub fn sort_top_last<T: Topology + ?Sized>(topology: &T, tasks: Vec<Task>) -> Sequenced {
    let mut pool = pre_sort(tasks);
    let mut ordered = by_preferred(place_by_tier(topology, &mut pool, TierPass::BelowTop));
    ordered.extend(by_preferred(place_by_tier(topology, &mut pool, TierPass::TopOnly)));

    let (kept, unplaced) = split_unmatched(pool);
    ordered.extend(by_preferred(kept));
    Sequenced { ordered, unplaced }
}

/// Bays of every path, in path order, each listed once
pub(crate) fn path_bays<T: Topology + ?Sized>(topology: &T) -> Vec<LocationId> {
    let mut seen = HashSet::new();
    topology
        .paths()
        .iter()
        .flat_map(|path| topology.bays_on_path(path))
        .filter(|bay| seen.insert(bay.clone()))
        .collect()
}

/// Move tasks out of `pool` in bay and tier order
///
/// Tasks left in `pool` matched no visited tier.
pub(crate) fn place_by_tier<T: Topology + ?Sized>(
    topology: &T,
    pool: &mut Vec<Task>,
    pass: TierPass,
) -> Vec<Task> {
    let mut placed = Vec::with_capacity(pool.len());
    for bay in path_bays(topology) {
        let tiers = topology.children_in_working_order(&bay);
        for (index, tier) in tiers.iter().enumerate() {
            if pool.is_empty() {
                return placed;
            }
            if pass.visits(index) {
                placed.extend(take_in_tier(topology, pool, tier));
            }
        }
    }
    placed
}

fn take_in_tier<T: Topology + ?Sized>(
    topology: &T,
    pool: &mut Vec<Task>,
    tier: &LocationId,
) -> Vec<Task> {
    let (taken, rest): (Vec<Task>, Vec<Task>) =
        std::mem::take(pool).into_iter().partition(|task| {
            task.location_id
                .as_ref()
                .is_some_and(|location| topology.is_within(location, tier))
        });
    *pool = rest;
    taken
}

/// Keep unmatched tasks with a preferred sequence, then order by it
fn finish(mut ordered: Vec<Task>, pool: Vec<Task>) -> Sequenced {
    let (kept, unplaced) = split_unmatched(pool);
    ordered.extend(kept);
    Sequenced {
        ordered: by_preferred(ordered),
        unplaced,
    }
}

/// Split unmatched tasks into those kept for their preferred sequence and
/// those that cannot be sequenced
fn split_unmatched(pool: Vec<Task>) -> (Vec<Task>, Vec<Task>) {
    let (kept, unplaced): (Vec<Task>, Vec<Task>) = pool
        .into_iter()
        .partition(|task| task.preferred_sequence.is_some());

    for task in &unplaced {
        tracing::warn!(
            task_id = %task.id,
            location = ?task.location_id,
            "task is in no path bay tier and has no preferred sequence; not sequenced"
        );
    }
    (kept, unplaced)
}

/// Stable sort by preferred sequence, unset last
fn by_preferred(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by(|a, b| nulls_last(a.preferred_sequence.as_ref(), b.preferred_sequence.as_ref()));
    tasks
}
