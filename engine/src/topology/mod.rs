//! In-memory facility layout
//!
//! `FacilityLayout` implements [`sdk::Topology`] over plain records. It backs
//! the CLI (loaded from a JSON layout file) and every test fixture.
//!
//! # Layout file
//!
//! ```json
//! {
//!   "facility": "F1",
//!   "locations": [
//!     { "id": "F1.A1", "level": "aisle", "parent": "F1", "pathSegment": "S1",
//!       "controller": { "address": "0x0012", "channel": 1 } },
//!     { "id": "F1.A1.B1", "level": "bay", "parent": "F1.A1", "label": "B1" },
//!     { "id": "F1.A1.B1.T1", "level": "tier", "parent": "F1.A1.B1",
//!       "firstLed": 1, "lastLed": 80, "width": 2.5, "positionAlongPath": 1.0 }
//!   ],
//!   "paths": [ { "id": "P1", "bays": ["F1.A1.B1"] } ]
//! }
//! ```
//!
//! Children keep the order in which they were inserted; that order is the
//! working order. Path segment, position along path and controller are
//! inherited from the nearest ancestor that defines them.

use sdk::errors::EngineError;
use sdk::types::{ControllerRef, LocationId, LocationLevel};
use sdk::{IndicatorSpan, Topology};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// One location of the hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    pub id: LocationId,
    pub level: LocationLevel,
    #[serde(default)]
    pub parent: Option<LocationId>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub first_led: Option<u16>,
    #[serde(default)]
    pub last_led: Option<u16>,
    #[serde(default = "default_true")]
    pub lower_led_near_anchor: bool,
    /// Width in meters
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub path_segment: Option<String>,
    #[serde(default)]
    pub position_along_path: Option<f64>,
    #[serde(default)]
    pub controller: Option<ControllerRef>,
}

fn default_true() -> bool {
    true
}

impl LocationRecord {
    pub fn new(id: impl Into<LocationId>, level: LocationLevel) -> Self {
        Self {
            id: id.into(),
            level,
            parent: None,
            label: None,
            first_led: None,
            last_led: None,
            lower_led_near_anchor: true,
            width: None,
            path_segment: None,
            position_along_path: None,
            controller: None,
        }
    }

    fn child(id: impl Into<LocationId>, level: LocationLevel, parent: impl Into<LocationId>) -> Self {
        let mut record = Self::new(id, level);
        record.parent = Some(parent.into());
        record
    }

    pub fn aisle(id: impl Into<LocationId>, parent: impl Into<LocationId>) -> Self {
        Self::child(id, LocationLevel::Aisle, parent)
    }

    pub fn bay(id: impl Into<LocationId>, parent: impl Into<LocationId>) -> Self {
        Self::child(id, LocationLevel::Bay, parent)
    }

    pub fn tier(id: impl Into<LocationId>, parent: impl Into<LocationId>) -> Self {
        Self::child(id, LocationLevel::Tier, parent)
    }

    pub fn slot(id: impl Into<LocationId>, parent: impl Into<LocationId>) -> Self {
        Self::child(id, LocationLevel::Slot, parent)
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.path_segment = Some(segment.into());
        self
    }

    pub fn leds(mut self, first: u16, last: u16) -> Self {
        self.first_led = Some(first);
        self.last_led = Some(last);
        self
    }

    pub fn width(mut self, meters: f64) -> Self {
        self.width = Some(meters);
        self
    }

    pub fn position(mut self, position: f64) -> Self {
        self.position_along_path = Some(position);
        self
    }

    pub fn controller(mut self, address: impl Into<String>, channel: u8) -> Self {
        self.controller = Some(ControllerRef {
            address: address.into(),
            channel,
        });
        self
    }

    /// Strip wired with its highest position at the anchor
    pub fn far_anchor(mut self) -> Self {
        self.lower_led_near_anchor = false;
        self
    }
}

/// A path and the bays it passes, in path order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathRecord {
    pub id: String,
    pub bays: Vec<LocationId>,
}

/// On-disk shape of a layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutFile {
    pub facility: LocationId,
    #[serde(default)]
    pub locations: Vec<LocationRecord>,
    #[serde(default)]
    pub paths: Vec<PathRecord>,
}

/// Facility topology held in memory
#[derive(Debug, Clone)]
pub struct FacilityLayout {
    facility: LocationId,
    records: HashMap<LocationId, LocationRecord>,
    children: HashMap<LocationId, Vec<LocationId>>,
    paths: Vec<PathRecord>,
}

impl FacilityLayout {
    /// Create a layout holding only the facility root
    pub fn new(facility: impl Into<LocationId>) -> Self {
        let facility = facility.into();
        let mut records = HashMap::new();
        records.insert(
            facility.clone(),
            LocationRecord::new(facility.clone(), LocationLevel::Facility),
        );
        Self {
            facility,
            records,
            children: HashMap::new(),
            paths: Vec::new(),
        }
    }

    /// Add or replace a location
    ///
    /// A new location is appended to its parent's working order. Replacing a
    /// location keeps its position and children.
    pub fn insert(&mut self, record: LocationRecord) {
        let is_new = !self.records.contains_key(&record.id);
        if is_new {
            if let Some(parent) = &record.parent {
                self.children
                    .entry(parent.clone())
                    .or_default()
                    .push(record.id.clone());
            }
        }
        self.records.insert(record.id.clone(), record);
    }

    /// Add a path through the given bays
    pub fn add_path(&mut self, id: impl Into<String>, bays: Vec<LocationId>) {
        self.paths.push(PathRecord {
            id: id.into(),
            bays,
        });
    }

    pub fn get(&self, id: &LocationId) -> Option<&LocationRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Build a layout from its file form and validate it
    pub fn from_layout_file(file: LayoutFile) -> Result<Self, EngineError> {
        let mut layout = Self::new(file.facility);
        for record in file.locations {
            if record.id == layout.facility {
                return Err(EngineError::Topology(format!(
                    "location {} redefines the facility root",
                    record.id
                )));
            }
            layout.insert(record);
        }
        for path in file.paths {
            layout.paths.push(path);
        }
        layout.validate()?;
        Ok(layout)
    }

    /// Load and validate a JSON layout file
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)?;
        let file: LayoutFile = serde_json::from_str(&contents)?;
        Self::from_layout_file(file)
    }

    /// Check parents and path bays refer to known locations
    ///
    /// # Errors
    ///
    /// - `UnknownLocation` for a dangling parent or path bay
    /// - `Topology` for a parent chain that does not reach the facility, or a
    ///   path entry that is not a bay
    pub fn validate(&self) -> Result<(), EngineError> {
        for record in self.records.values() {
            if record.id == self.facility {
                continue;
            }
            let Some(parent) = &record.parent else {
                return Err(EngineError::Topology(format!(
                    "location {} has no parent",
                    record.id
                )));
            };
            if !self.records.contains_key(parent) {
                return Err(EngineError::UnknownLocation(parent.to_string()));
            }
            if !self.reaches_facility(&record.id) {
                return Err(EngineError::Topology(format!(
                    "location {} does not descend from {}",
                    record.id, self.facility
                )));
            }
        }

        for path in &self.paths {
            for bay in &path.bays {
                let Some(record) = self.records.get(bay) else {
                    return Err(EngineError::UnknownLocation(bay.to_string()));
                };
                if record.level != LocationLevel::Bay {
                    return Err(EngineError::Topology(format!(
                        "path {} lists {} which is not a bay",
                        path.id, bay
                    )));
                }
            }
        }

        Ok(())
    }

    fn reaches_facility(&self, id: &LocationId) -> bool {
        let mut current = Some(id);
        // A parent chain longer than the number of records is a cycle
        for _ in 0..=self.records.len() {
            match current {
                Some(location) if *location == self.facility => return true,
                Some(location) => {
                    current = self
                        .records
                        .get(location)
                        .and_then(|record| record.parent.as_ref());
                }
                None => return false,
            }
        }
        false
    }

    /// First value found walking from the location up to the root
    fn inherited<V>(&self, location: &LocationId, pick: impl Fn(&LocationRecord) -> Option<V>) -> Option<V> {
        let mut current = self.records.get(location);
        for _ in 0..=self.records.len() {
            let record = current?;
            if let Some(value) = pick(record) {
                return Some(value);
            }
            current = record.parent.as_ref().and_then(|p| self.records.get(p));
        }
        None
    }
}

impl Topology for FacilityLayout {
    fn facility(&self) -> &LocationId {
        &self.facility
    }

    fn paths(&self) -> Vec<String> {
        self.paths.iter().map(|path| path.id.clone()).collect()
    }

    fn bays_on_path(&self, path: &str) -> Vec<LocationId> {
        self.paths
            .iter()
            .find(|record| record.id == path)
            .map(|record| record.bays.clone())
            .unwrap_or_default()
    }

    fn children_in_working_order(&self, location: &LocationId) -> Vec<LocationId> {
        self.children.get(location).cloned().unwrap_or_default()
    }

    fn parent(&self, location: &LocationId) -> Option<LocationId> {
        self.records.get(location)?.parent.clone()
    }

    fn level(&self, location: &LocationId) -> Option<LocationLevel> {
        self.records.get(location).map(|record| record.level)
    }

    fn path_segment(&self, location: &LocationId) -> Option<String> {
        self.inherited(location, |record| record.path_segment.clone())
    }

    fn position_along_path(&self, location: &LocationId) -> Option<f64> {
        self.inherited(location, |record| record.position_along_path)
    }

    fn indicator_span(&self, location: &LocationId) -> Option<IndicatorSpan> {
        let record = self.records.get(location)?;
        match (record.first_led, record.last_led) {
            (Some(first), Some(last)) if first > 0 && last > 0 => {
                Some(IndicatorSpan { first, last })
            }
            _ => None,
        }
    }

    fn width(&self, location: &LocationId) -> Option<f64> {
        self.records.get(location)?.width
    }

    fn lower_led_near_anchor(&self, location: &LocationId) -> bool {
        self.records
            .get(location)
            .map(|record| record.lower_led_near_anchor)
            .unwrap_or(true)
    }

    fn is_slot(&self, location: &LocationId) -> bool {
        self.level(location) == Some(LocationLevel::Slot)
    }

    fn label(&self, location: &LocationId) -> Option<String> {
        let record = self.records.get(location)?;
        Some(record.label.clone().unwrap_or_else(|| record.id.to_string()))
    }

    fn controller(&self, location: &LocationId) -> Option<ControllerRef> {
        self.inherited(location, |record| record.controller.clone())
    }
}
