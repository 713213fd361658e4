//! Stable pre-sort by position along path
//!
//! Tasks with an unknown position (unset or `0.0`) come first. Among
//! themselves they are ordered by pick label, then item id; when either label
//! is missing the two tasks compare equal and keep their input order.

use sdk::types::Task;
use std::cmp::Ordering;

use super::nulls_last;

/// Stably sort tasks by position along path
pub fn pre_sort(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by(compare_position);
    tasks
}

/// Ordering used by [`pre_sort`]
pub fn compare_position(a: &Task, b: &Task) -> Ordering {
    match (a.known_position(), b.known_position()) {
        (Some(p1), Some(p2)) => p1.total_cmp(&p2),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => compare_unknown_position(a, b),
    }
}

fn compare_unknown_position(a: &Task, b: &Task) -> Ordering {
    let (Some(label1), Some(label2)) = (&a.pick_label, &b.pick_label) else {
        return Ordering::Equal;
    };
    label1
        .cmp(label2)
        .then_with(|| nulls_last(a.item_id.as_ref(), b.item_id.as_ref()))
}
