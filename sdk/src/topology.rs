//! Read-only facility topology
//!
//! The sequencing, housekeeping and lighting logic only ever asks the
//! topology a handful of questions. This trait is that narrow surface, so the
//! algorithms can run against a live object graph or a plain in-memory layout
//! alike. Implementations must not change while one sequencing call is in
//! progress.

use crate::types::{ControllerRef, LocationId, LocationLevel};

/// Inclusive addressable indicator span of a location, as configured
///
/// `first` may be greater than `last` when the strip is wired in reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorSpan {
    pub first: u16,
    pub last: u16,
}

/// Facility topology collaborator
pub trait Topology {
    /// The facility root location
    fn facility(&self) -> &LocationId;

    /// Paths of the facility, in facility order
    fn paths(&self) -> Vec<String>;

    /// Bay-level locations reachable along a path, in path order
    fn bays_on_path(&self, path: &str) -> Vec<LocationId>;

    /// Children of a location in working order
    fn children_in_working_order(&self, location: &LocationId) -> Vec<LocationId>;

    /// Direct parent, `None` for the facility root or unknown locations
    fn parent(&self, location: &LocationId) -> Option<LocationId>;

    fn level(&self, location: &LocationId) -> Option<LocationLevel>;

    /// Path segment the location is associated with
    fn path_segment(&self, location: &LocationId) -> Option<String>;

    /// Precomputed distance along path
    fn position_along_path(&self, location: &LocationId) -> Option<f64>;

    fn indicator_span(&self, location: &LocationId) -> Option<IndicatorSpan>;

    /// Physical width in meters
    fn width(&self, location: &LocationId) -> Option<f64>;

    /// Whether the lowest indicator position sits at the location's anchor
    fn lower_led_near_anchor(&self, location: &LocationId) -> bool;

    /// Whether the location is a single-SKU slot
    fn is_slot(&self, location: &LocationId) -> bool;

    /// Primary display label
    fn label(&self, location: &LocationId) -> Option<String>;

    /// Controller driving the location's indicators
    fn controller(&self, location: &LocationId) -> Option<ControllerRef>;

    /// The location itself or its nearest ancestor at `level`
    fn ancestor_at_level(
        &self,
        location: &LocationId,
        level: LocationLevel,
    ) -> Option<LocationId> {
        let mut current = Some(location.clone());
        while let Some(id) = current {
            if self.level(&id)? == level {
                return Some(id);
            }
            current = self.parent(&id);
        }
        None
    }

    /// Whether `location` is `container` or lies beneath it
    fn is_within(&self, location: &LocationId, container: &LocationId) -> bool {
        let mut current = Some(location.clone());
        while let Some(id) = current {
            if &id == container {
                return true;
            }
            current = self.parent(&id);
        }
        false
    }
}
