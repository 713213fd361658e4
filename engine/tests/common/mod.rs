//! Shared fixtures for engine integration tests

#![allow(dead_code)]

use picklight_engine::topology::{FacilityLayout, LocationRecord};
use sdk::types::{InventoryRef, LocationId, Task, TaskKind};

pub const CART: &str = "CHE1";

/// Three aisles on one snaking path
///
/// ```text
/// P1: A1.B1 -> A2.B1 -> A1.B2 -> A3.B1
/// ```
///
/// A1 and A2 share path segment S1 and face each other; their B1 bays carry
/// the same label. A3 is on segment S2. Every bay lists its top tier T1 before
/// T2 in working order. A1.B1.T2 holds a 28-position pallet slot.
pub fn warehouse() -> FacilityLayout {
    let mut layout = FacilityLayout::new("F1");

    layout.insert(
        LocationRecord::aisle("F1.A1", "F1")
            .segment("S1")
            .controller("0x00000012", 1),
    );
    layout.insert(LocationRecord::bay("F1.A1.B1", "F1.A1").label("B1").position(1.0));
    layout.insert(LocationRecord::tier("F1.A1.B1.T1", "F1.A1.B1").leds(1, 80).width(2.5));
    layout.insert(LocationRecord::tier("F1.A1.B1.T2", "F1.A1.B1").leds(81, 160).width(2.5));
    layout.insert(LocationRecord::slot("F1.A1.B1.T2.S1", "F1.A1.B1.T2").leds(161, 188));
    layout.insert(LocationRecord::bay("F1.A1.B2", "F1.A1").label("B2").position(3.0));
    layout.insert(LocationRecord::tier("F1.A1.B2.T1", "F1.A1.B2").leds(1, 80).width(2.5).far_anchor());
    layout.insert(LocationRecord::tier("F1.A1.B2.T2", "F1.A1.B2"));

    layout.insert(
        LocationRecord::aisle("F1.A2", "F1")
            .segment("S1")
            .controller("0x00000013", 1),
    );
    layout.insert(LocationRecord::bay("F1.A2.B1", "F1.A2").label("B1").position(1.0));
    layout.insert(LocationRecord::tier("F1.A2.B1.T1", "F1.A2.B1").leds(1, 80).width(2.5));
    layout.insert(LocationRecord::tier("F1.A2.B1.T2", "F1.A2.B1"));

    layout.insert(
        LocationRecord::aisle("F1.A3", "F1")
            .segment("S2")
            .controller("0x00000014", 2),
    );
    layout.insert(LocationRecord::bay("F1.A3.B1", "F1.A3").label("B1").position(6.0));
    layout.insert(LocationRecord::tier("F1.A3.B1.T1", "F1.A3.B1"));
    layout.insert(LocationRecord::tier("F1.A3.B1.T2", "F1.A3.B1"));

    layout.add_path(
        "P1",
        vec![
            LocationId::from("F1.A1.B1"),
            LocationId::from("F1.A2.B1"),
            LocationId::from("F1.A1.B2"),
            LocationId::from("F1.A3.B1"),
        ],
    );
    layout
}

/// Every tier of the warehouse, in path then working order
pub fn tiers() -> Vec<&'static str> {
    vec![
        "F1.A1.B1.T1",
        "F1.A1.B1.T2",
        "F1.A2.B1.T1",
        "F1.A2.B1.T2",
        "F1.A1.B2.T1",
        "F1.A1.B2.T2",
        "F1.A3.B1.T1",
        "F1.A3.B1.T2",
    ]
}

/// A planned pick already assigned to [`CART`]
pub fn pick(id: &str, location: &str) -> Task {
    Task::new(id, TaskKind::Plan).at(location).assigned_to(CART)
}

/// A planned pick drawing an item stored `meters` from the location's anchor
pub fn item_pick(id: &str, location: &str, meters: Option<f64>) -> Task {
    pick(id, location).with_inventory(InventoryRef {
        location_id: LocationId::from(location),
        meters_from_anchor: meters,
        position_along_path: None,
    })
}

pub fn ids(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|t| t.id.as_str()).collect()
}
