//! Lighting pattern selection
//!
//! Each task carries a serialized list of [`LedCmdGroup`]s telling the aisle
//! controllers which positions to light. Exactly one source applies per
//! task, first match wins:
//!
//! 1. **Put locations** (cross-dock / put-wall): every lightable location,
//!    at most 3 positions each
//! 2. **Inventory**: the item's position within its location (or the centre
//!    of the nearest lit bay or aisle),
//!    at most 4 positions, or the full span of a 26 to 31 position pallet slot
//! 3. **Housekeeping**: the aisle pattern for synthetic tasks, currently empty
//! 4. **None**
//!
//! A task with nothing to light still gets the explicit empty array `[]`.

use sdk::types::{
    Color, InventoryRef, LedCmdGroup, LedSample, LocationId, LocationLevel, Task,
    EMPTY_LED_STREAM,
};
use sdk::{IndicatorSpan, Topology};

use crate::geometry::{compute_range, compute_range_no_offset, IndicatorRange};

/// Most positions lit per put location
pub const PUT_WALL_MAX_LIT: usize = 3;

/// Most positions lit for one inventory item, outside the pallet band
pub const ITEM_MAX_LIT: i32 = 4;

/// Where a task's lighting pattern comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightingSource {
    PutLocations,
    Inventory,
    Housekeeping,
    None,
}

impl LightingSource {
    pub fn for_task(task: &Task) -> Self {
        if !task.put_locations.is_empty() {
            Self::PutLocations
        } else if task.inventory.is_some() {
            Self::Inventory
        } else if task.kind.is_housekeeping() {
            Self::Housekeeping
        } else {
            Self::None
        }
    }
}

/// Compute and store the lighting payload of `task`
pub fn apply<T: Topology + ?Sized>(topology: &T, task: &mut Task, color: Color) {
    let commands = commands_for(topology, task, color);
    task.led_cmd_stream = serialize_commands(&commands);
}

/// Lighting commands for `task`
pub fn commands_for<T: Topology + ?Sized>(
    topology: &T,
    task: &Task,
    color: Color,
) -> Vec<LedCmdGroup> {
    match LightingSource::for_task(task) {
        LightingSource::PutLocations => put_wall_commands(topology, &task.put_locations, color),
        LightingSource::Inventory => match &task.inventory {
            Some(inventory) => inventory_commands(topology, inventory, color),
            None => Vec::new(),
        },
        LightingSource::Housekeeping => housekeeping_commands(),
        LightingSource::None => Vec::new(),
    }
}

/// One command group per lightable put location
///
/// Locations without an indicator span, without a controller, or on channel
/// 0 are skipped.
pub fn put_wall_commands<T: Topology + ?Sized>(
    topology: &T,
    locations: &[LocationId],
    color: Color,
) -> Vec<LedCmdGroup> {
    locations
        .iter()
        .filter_map(|location| {
            let span = topology.indicator_span(location)?;
            let controller = topology.controller(location)?;
            if controller.channel == 0 {
                tracing::debug!(location = %location, "put location on channel 0, not lit");
                return None;
            }

            let (first, last) = ascending(span);
            let range = compute_range_no_offset(
                i32::from(first),
                i32::from(last),
                topology.lower_led_near_anchor(location),
                topology.is_slot(location),
            );
            let samples: Vec<LedSample> = samples(range, color)
                .into_iter()
                .take(PUT_WALL_MAX_LIT)
                .collect();
            command_group(controller.address, controller.channel, samples)
        })
        .collect()
}

/// Command group for one inventory item
///
/// The item's offset from anchor is mapped onto its location's strip. An
/// item on an unlit location lights the centre of the nearest lit bay or
/// aisle instead. Missing span or controller is logged and yields no command.
pub fn inventory_commands<T: Topology + ?Sized>(
    topology: &T,
    inventory: &InventoryRef,
    color: Color,
) -> Vec<LedCmdGroup> {
    let Some(location) = effective_lightable_location(topology, &inventory.location_id) else {
        tracing::debug!(location = %inventory.location_id, "no lightable location for item");
        return Vec::new();
    };
    let Some(span) = topology.indicator_span(&location) else {
        return Vec::new();
    };
    let Some(controller) = topology.controller(&location) else {
        tracing::error!(location = %location, "lightable location has no controller");
        return Vec::new();
    };

    let (first, last) = ascending(span);
    let near_anchor = topology.lower_led_near_anchor(&location);
    let is_slot = topology.is_slot(&location);
    // The item's offset is measured within its own location, not a lit ancestor
    let range = if location == inventory.location_id {
        compute_range(
            i32::from(first),
            i32::from(last),
            near_anchor,
            topology.width(&location),
            inventory.meters_from_anchor,
            is_slot,
        )
    } else {
        compute_range_no_offset(i32::from(first), i32::from(last), near_anchor, is_slot)
    }
    .cap(ITEM_MAX_LIT);

    command_group(controller.address, controller.channel, samples(range, color))
        .into_iter()
        .collect()
}

/// Aisle pattern shown for housekeeping tasks
pub fn housekeeping_commands() -> Vec<LedCmdGroup> {
    Vec::new()
}

/// The location itself if it has indicators, else its nearest bay or aisle
/// ancestor that does
pub fn effective_lightable_location<T: Topology + ?Sized>(
    topology: &T,
    location: &LocationId,
) -> Option<LocationId> {
    if topology.indicator_span(location).is_some() {
        return Some(location.clone());
    }

    let mut current = topology.parent(location);
    while let Some(parent) = current {
        let lit = topology.indicator_span(&parent).is_some();
        if lit
            && matches!(
                topology.level(&parent),
                Some(LocationLevel::Bay | LocationLevel::Aisle)
            )
        {
            return Some(parent);
        }
        current = topology.parent(&parent);
    }
    None
}

/// Serialize commands as the task's lighting payload
///
/// Always yields a JSON array; an encoding failure is logged and yields `[]`.
pub fn serialize_commands(commands: &[LedCmdGroup]) -> String {
    if commands.is_empty() {
        return EMPTY_LED_STREAM.to_string();
    }
    match serde_json::to_string(commands) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize lighting commands");
            EMPTY_LED_STREAM.to_string()
        }
    }
}

fn ascending(span: IndicatorSpan) -> (u16, u16) {
    if span.first <= span.last {
        (span.first, span.last)
    } else {
        (span.last, span.first)
    }
}

/// Samples for every position of the range, in range order
fn samples(range: IndicatorRange, color: Color) -> Vec<LedSample> {
    if range.is_zero() {
        return Vec::new();
    }
    let step = if range.is_ascending() { 1 } else { -1 };
    (0..range.len())
        .filter_map(|i| u16::try_from(range.first + i * step).ok())
        .filter(|position| *position > 0)
        .map(|position| LedSample { position, color })
        .collect()
}

fn command_group(address: String, channel: u8, samples: Vec<LedSample>) -> Option<LedCmdGroup> {
    let first_position = samples.first()?.position;
    Some(LedCmdGroup {
        controller_address: address,
        channel,
        first_position,
        samples,
    })
}
