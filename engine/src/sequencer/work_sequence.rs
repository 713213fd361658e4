//! Work-sequence priority
//!
//! Bay-distance traversal, then a stable sort by preferred sequence, item id
//! and order id (each with unset values last). Tasks no tier takes are kept
//! and appended before the final sort.

use sdk::types::Task;
use sdk::Topology;

use super::bay_distance::{place_by_tier, TierPass};
use super::presort::pre_sort;
use super::{nulls_last, Sequenced};

pub fn sort<T: Topology + ?Sized>(topology: &T, tasks: Vec<Task>) -> Sequenced {
    let mut pool = pre_sort(tasks);
    let mut ordered = place_by_tier(topology, &mut pool, TierPass::All);

    if !pool.is_empty() {
        tracing::debug!(count = pool.len(), "appending tasks outside path bays");
    }
    ordered.extend(pool);

    ordered.sort_by(|a, b| {
        nulls_last(a.preferred_sequence.as_ref(), b.preferred_sequence.as_ref())
            .then_with(|| nulls_last(a.item_id.as_ref(), b.item_id.as_ref()))
            .then_with(|| nulls_last(a.order_id.as_ref(), b.order_id.as_ref()))
    });

    Sequenced {
        ordered,
        unplaced: Vec::new(),
    }
}
