//! Work-instruction and lighting types
//!
//! A [`Task`] is the atomic unit of physical work handed to a cart. Tasks are
//! created by the task-generation collaborator, mutated in place by the engine
//! (position along path, lighting payload, sort code) and handed back for
//! persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lighting payload meaning "nothing to light".
///
/// Device logic treats a missing payload as a fault, so this is written
/// instead of leaving the field empty.
pub const EMPTY_LED_STREAM: &str = "[]";

/// Identifier of a location in the facility hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub String);

impl LocationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LocationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for LocationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Level of a location in the containment hierarchy
///
/// Ordered from the root down: facility, aisle, bay, tier, slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationLevel {
    Facility,
    Aisle,
    Bay,
    Tier,
    Slot,
}

/// Kind of a work instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskKind {
    /// Planned pick or put
    Plan,
    /// Completed work recorded from the device
    Actual,
    /// Light-only instruction
    Indicator,
    /// Synthetic acknowledgment inserted on a bay change
    #[serde(rename = "HK_BAYCOMPLETE")]
    HkBayComplete,
    /// Synthetic acknowledgment inserted when the same cart position repeats
    #[serde(rename = "HK_REPEATPOS")]
    HkRepeatPos,
}

impl TaskKind {
    /// Whether this kind is one of the synthetic housekeeping kinds
    pub fn is_housekeeping(self) -> bool {
        matches!(self, TaskKind::HkBayComplete | TaskKind::HkRepeatPos)
    }
}

/// Lifecycle status of a work instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    New,
    Inprogress,
    Short,
    Complete,
    Revert,
    Invalid,
}

/// Indicator colour sent with each lit position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Color {
    Red,
    Green,
    #[default]
    Blue,
    Cyan,
    Magenta,
    Orange,
    White,
}

/// The inventory item a pick draws from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRef {
    /// Location the item is stored at
    pub location_id: LocationId,

    /// Offset of the item from the location's anchor, in meters
    #[serde(default)]
    pub meters_from_anchor: Option<f64>,

    /// Item-specific distance along path (unslotted inventory)
    #[serde(default)]
    pub position_along_path: Option<f64>,
}

/// One work instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub kind: TaskKind,
    #[serde(default)]
    pub status: TaskStatus,

    /// Target location of the work
    #[serde(default)]
    pub location_id: Option<LocationId>,
    /// Cart container (maps to a cart position)
    #[serde(default)]
    pub container_id: Option<String>,
    #[serde(default)]
    pub item_id: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,

    #[serde(default)]
    pub plan_quantity: Option<i32>,
    #[serde(default)]
    pub plan_min_quantity: Option<i32>,
    #[serde(default)]
    pub plan_max_quantity: Option<i32>,
    #[serde(default)]
    pub actual_quantity: i32,

    /// Distance along the path; `None` or `0.0` means unknown
    #[serde(default)]
    pub position_along_path: Option<f64>,
    /// Externally assigned work sequence
    #[serde(default)]
    pub preferred_sequence: Option<i32>,
    /// Human-readable pick location shown to the operator
    #[serde(default)]
    pub pick_label: Option<String>,
    #[serde(default)]
    pub description: String,

    /// Cart the task is assigned to
    #[serde(default)]
    pub assigned_cart: Option<String>,
    #[serde(default)]
    pub assigned_at: Option<DateTime<Utc>>,

    /// Cross-dock / put-wall destinations
    #[serde(default)]
    pub put_locations: Vec<LocationId>,
    /// Resolved inventory for an outbound pick
    #[serde(default)]
    pub inventory: Option<InventoryRef>,

    /// Serialized lighting commands (a JSON array)
    #[serde(default = "empty_led_stream")]
    pub led_cmd_stream: String,
    /// Final ordinal label, assigned after sequencing
    #[serde(default)]
    pub sort_code: Option<String>,
}

fn empty_led_stream() -> String {
    EMPTY_LED_STREAM.to_string()
}

impl Task {
    /// Create a new planned task with everything else unset
    pub fn new(id: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            id: id.into(),
            kind,
            status: TaskStatus::New,
            location_id: None,
            container_id: None,
            item_id: None,
            order_id: None,
            plan_quantity: None,
            plan_min_quantity: None,
            plan_max_quantity: None,
            actual_quantity: 0,
            position_along_path: None,
            preferred_sequence: None,
            pick_label: None,
            description: String::new(),
            assigned_cart: None,
            assigned_at: None,
            put_locations: Vec::new(),
            inventory: None,
            led_cmd_stream: empty_led_stream(),
            sort_code: None,
        }
    }

    pub fn at(mut self, location: impl Into<LocationId>) -> Self {
        self.location_id = Some(location.into());
        self
    }

    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container_id = Some(container.into());
        self
    }

    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.item_id = Some(item.into());
        self
    }

    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order_id = Some(order.into());
        self
    }

    pub fn with_quantity(mut self, quantity: i32) -> Self {
        self.plan_quantity = Some(quantity);
        self.plan_min_quantity = Some(quantity);
        self.plan_max_quantity = Some(quantity);
        self
    }

    pub fn with_position(mut self, position: f64) -> Self {
        self.position_along_path = Some(position);
        self
    }

    pub fn with_preferred_sequence(mut self, sequence: i32) -> Self {
        self.preferred_sequence = Some(sequence);
        self
    }

    pub fn with_pick_label(mut self, label: impl Into<String>) -> Self {
        self.pick_label = Some(label.into());
        self
    }

    pub fn assigned_to(mut self, cart: impl Into<String>) -> Self {
        self.assigned_cart = Some(cart.into());
        self
    }

    pub fn with_inventory(mut self, inventory: InventoryRef) -> Self {
        self.inventory = Some(inventory);
        self
    }

    pub fn with_put_locations(mut self, locations: Vec<LocationId>) -> Self {
        self.put_locations = locations;
        self
    }

    /// Position along path if known; zero counts as unknown
    pub fn known_position(&self) -> Option<f64> {
        self.position_along_path.filter(|p| *p != 0.0)
    }
}

/// Controller and channel that drive a location's indicator strip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerRef {
    pub address: String,
    pub channel: u8,
}

/// One lit position on an indicator strip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedSample {
    #[serde(rename = "pos")]
    pub position: u16,
    pub color: Color,
}

/// Commands for one controller channel
///
/// Serialized as one element of a task's lighting payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedCmdGroup {
    #[serde(rename = "ctrl")]
    pub controller_address: String,
    #[serde(rename = "chan")]
    pub channel: u8,
    #[serde(rename = "pos")]
    pub first_position: u16,
    #[serde(rename = "ledSamples")]
    pub samples: Vec<LedSample>,
}
