//! Compute-work pipeline
//!
//! Turns a cart's candidate tasks into the final work list:
//!
//! 1. Resolve each task's position along path
//! 2. Read the facility's settings (never cached)
//! 3. Sequence with the configured strategy
//! 4. Splice in housekeeping tasks
//! 5. Attach lighting payloads
//! 6. Assign sort codes `0001`, `0002`, ...
//!
//! Every step recovers locally from bad data, so the pipeline always returns
//! a plan. Nothing is persisted here; the caller commits the returned tasks
//! as one unit.
//!
//! # Examples
//!
//! ```
//! use picklight_engine::config::Config;
//! use picklight_engine::topology::{FacilityLayout, LocationRecord};
//! use picklight_engine::work::{compute_work, CartContext};
//! use sdk::{Color, LocationId, Task, TaskKind};
//!
//! let mut layout = FacilityLayout::new("F1");
//! layout.insert(LocationRecord::aisle("F1.A1", "F1"));
//! layout.insert(LocationRecord::bay("F1.A1.B1", "F1.A1"));
//! layout.insert(LocationRecord::tier("F1.A1.B1.T1", "F1.A1.B1"));
//! layout.add_path("P1", vec![LocationId::from("F1.A1.B1")]);
//!
//! let cart = CartContext::new("CHE1", Color::Blue);
//! let tasks = vec![Task::new("wi-1", TaskKind::Plan).at("F1.A1.B1.T1")];
//! let plan = compute_work(&layout, &Config::default_config(), &cart, tasks);
//!
//! assert_eq!(plan.tasks[0].sort_code.as_deref(), Some("0001"));
//! assert_eq!(plan.tasks[0].led_cmd_stream, "[]");
//! ```

use chrono::{DateTime, Utc};
use sdk::types::{Color, Task};
use sdk::Topology;
use serde::Serialize;

use crate::config::{FacilitySettings, PropertySource};
use crate::housekeeping;
use crate::lighting;
use crate::sequencer::SequencerKind;

/// The cart work is being computed for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartContext {
    pub cart_id: String,
    /// Colour of the cart's indicators
    pub color: Color,
}

impl CartContext {
    pub fn new(cart_id: impl Into<String>, color: Color) -> Self {
        Self {
            cart_id: cart_id.into(),
            color,
        }
    }

    /// Assign unassigned tasks to this cart at `at`
    pub fn assign(&self, tasks: &mut [Task], at: DateTime<Utc>) {
        for task in tasks.iter_mut().filter(|t| t.assigned_cart.is_none()) {
            task.assigned_cart = Some(self.cart_id.clone());
            task.assigned_at = Some(at);
        }
    }
}

/// Outcome of one compute-work call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkPlan {
    /// Strategy that ordered the tasks
    pub sequencer: SequencerKind,
    /// Final tasks with sort codes and lighting payloads
    pub tasks: Vec<Task>,
    /// Number of synthetic housekeeping tasks in `tasks`
    pub housekeeping_inserted: usize,
    /// Tasks the strategy could not place, not part of `tasks`
    pub unplaced: Vec<Task>,
}

/// Compute the final work list for a cart
pub fn compute_work<T, P>(
    topology: &T,
    properties: &P,
    cart: &CartContext,
    mut tasks: Vec<Task>,
) -> WorkPlan
where
    T: Topology + ?Sized,
    P: PropertySource + ?Sized,
{
    let facility = topology.facility().clone();
    let span = tracing::info_span!("compute_work", facility = %facility, cart = %cart.cart_id);
    let _guard = span.enter();

    resolve_positions(topology, &mut tasks);

    let settings = FacilitySettings::resolve(properties, facility.as_str());
    tracing::debug!(
        sequencer = %settings.sequencer,
        bay_change = %settings.housekeeping.bay_change,
        repeat_pos = %settings.housekeeping.repeat_pos,
        "facility settings"
    );

    let sequenced = settings.sequencer.sort(topology, tasks);
    let placed = sequenced.ordered.len();

    let mut tasks = housekeeping::inject(topology, sequenced.ordered, settings.housekeeping);
    let housekeeping_inserted = tasks.len() - placed;

    for task in tasks.iter_mut() {
        lighting::apply(topology, task, cart.color);
    }
    assign_sort_codes(&mut tasks);

    tracing::info!(
        tasks = tasks.len(),
        housekeeping = housekeeping_inserted,
        unplaced = sequenced.unplaced.len(),
        "computed work"
    );

    WorkPlan {
        sequencer: settings.sequencer,
        tasks,
        housekeeping_inserted,
        unplaced: sequenced.unplaced,
    }
}

/// Set each task's position along path from the best source available
///
/// In order: the inventory item's own position (unslotted inventory), the
/// inventory location's position, the task location's position. A task
/// none of these resolve for keeps its current value.
pub fn resolve_positions<T: Topology + ?Sized>(topology: &T, tasks: &mut [Task]) {
    for task in tasks.iter_mut() {
        let from_item = task
            .inventory
            .as_ref()
            .and_then(|inv| inv.position_along_path)
            .filter(|p| *p != 0.0);
        let from_inventory_location = || {
            task.inventory
                .as_ref()
                .and_then(|inv| topology.position_along_path(&inv.location_id))
        };
        let from_location = || {
            task.location_id
                .as_ref()
                .and_then(|loc| topology.position_along_path(loc))
        };

        let resolved = from_item
            .or_else(from_inventory_location)
            .or_else(from_location);
        if resolved.is_some() {
            task.position_along_path = resolved;
        }
    }
}

/// Largest ordinal that fits the four-digit sort code
pub const MAX_SORT_CODE: usize = 9999;

/// Label every task with its 1-based, zero-padded ordinal
///
/// Lists longer than [`MAX_SORT_CODE`] still get increasing codes, but the
/// codes past it are wider than four digits.
pub fn assign_sort_codes(tasks: &mut [Task]) {
    if tasks.len() > MAX_SORT_CODE {
        tracing::warn!(
            tasks = tasks.len(),
            max = MAX_SORT_CODE,
            "work list too long for four-digit sort codes"
        );
    }
    for (index, task) in tasks.iter_mut().enumerate() {
        task.sort_code = Some(sort_code(index + 1));
    }
}

/// Sort code for a 1-based position in the final list
pub fn sort_code(ordinal: usize) -> String {
    format!("{:04}", ordinal)
}
