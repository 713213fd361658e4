//! Indicator range calculation
//!
//! Maps a physical offset within a location onto the discrete range of
//! indicator positions (LEDs) to light on that location's strip.
//!
//! # Addressing modes
//!
//! - **Exact**: slots, and spans of 5 or fewer positions, light the whole span
//!   when no usable offset is known.
//! - **Proportional**: the offset is converted to a fraction of the width,
//!   mapped onto the span, and a 4-wide window is lit around that point. The
//!   window is clamped independently at each end, so it can be narrower than
//!   4 near an edge.
//!
//! Invalid input never fails: it produces the zero range and a warning.
//!
//! # Examples
//!
//! ```
//! use picklight_engine::geometry::{compute_range, IndicatorRange};
//!
//! let range = compute_range(1, 80, true, Some(2.5), Some(0.5), false);
//! assert_eq!(range, IndicatorRange::new(15, 18));
//!
//! let range = compute_range(0, 80, true, Some(2.5), Some(0.5), false);
//! assert!(range.is_zero());
//! ```

use serde::{Deserialize, Serialize};

/// Spans at or below this size are addressed exactly
pub const EXACT_SPAN_MAX: i32 = 5;

/// Positions lit below the central position
const WINDOW_BELOW: i64 = 1;

/// Positions lit above the central position
const WINDOW_ABOVE: i64 = 2;

/// Range lengths strictly inside this band are never capped.
///
/// Full-pallet slots are wired with 26 to 31 positions and must light them
/// all.
pub const PALLET_EXEMPT_BAND: (i32, i32) = (25, 32);

/// Inclusive, 1-based range of indicator positions
///
/// `{0, 0}` is the sentinel for "nothing to light".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct IndicatorRange {
    pub first: i32,
    pub last: i32,
}

impl IndicatorRange {
    pub const ZERO: IndicatorRange = IndicatorRange { first: 0, last: 0 };

    pub fn new(first: i32, last: i32) -> Self {
        Self { first, last }
    }

    pub fn zero() -> Self {
        Self::ZERO
    }

    pub fn is_zero(&self) -> bool {
        self.first == 0 && self.last == 0
    }

    /// Number of positions covered, 0 for the zero range
    pub fn len(&self) -> i32 {
        if self.is_zero() {
            0
        } else {
            (self.last - self.first).abs() + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the range runs from low to high positions
    pub fn is_ascending(&self) -> bool {
        self.last - self.first >= 0
    }

    /// Inclusive membership test
    pub fn is_within(&self, position: i32) -> bool {
        self.first <= position && position <= self.last
    }

    /// `"first>last"`, or an empty string for the zero range
    pub fn range_string(&self) -> String {
        if self.first == 0 {
            return String::new();
        }
        format!("{}>{}", self.first, self.last)
    }

    /// Restrict the range to at most `max_count` positions
    ///
    /// The first position and the direction are kept. Ranges whose length
    /// falls inside [`PALLET_EXEMPT_BAND`] are returned at full length.
    pub fn cap(self, max_count: i32) -> Self {
        if self.is_zero() {
            return self;
        }

        let how_many = self.len();
        let (low, high) = PALLET_EXEMPT_BAND;
        let limit = if how_many > low && how_many < high {
            how_many
        } else {
            how_many.min(max_count)
        };

        if self.is_ascending() {
            Self::new(self.first, (self.first + limit - 1).max(0))
        } else {
            Self::new(self.first, (self.first - limit + 1).max(0))
        }
    }
}

/// Compute the positions to light for an offset within a location
///
/// # Arguments
///
/// * `first_addr` / `last_addr` - the location's indicator span, 1-based
/// * `first_near_anchor` - whether `first_addr` sits at the anchor end
/// * `width` - physical width of the location in meters; `None` counts as 0
/// * `offset` - distance of the target from the anchor; `None` counts as 0
/// * `is_slot` - single-SKU slot, addressed exactly
pub fn compute_range(
    first_addr: i32,
    last_addr: i32,
    first_near_anchor: bool,
    width: Option<f64>,
    offset: Option<f64>,
    is_slot: bool,
) -> IndicatorRange {
    let width = width.unwrap_or(0.0);
    let offset = offset.unwrap_or(0.0);

    if first_addr <= 0 || last_addr <= 0 {
        tracing::warn!(first_addr, last_addr, "non-positive indicator address");
        return IndicatorRange::zero();
    }
    if first_addr > last_addr {
        tracing::warn!(first_addr, last_addr, "inverted indicator span");
        return IndicatorRange::zero();
    }
    if !offset.is_finite() || !width.is_finite() {
        tracing::error!(width, offset, "width or offset from anchor is not a finite number");
        return IndicatorRange::zero();
    }
    if offset < 0.0 || width < 0.0 {
        tracing::error!(width, offset, "negative width or offset from anchor");
        return IndicatorRange::zero();
    }
    if offset > width {
        tracing::error!(width, offset, "offset from anchor larger than width");
        return IndicatorRange::zero();
    }

    // A zero offset is what an unset offset looks like, and an offset equal to
    // the width is the same value measured from the far end.
    let uninitialized = width == 0.0 || offset == 0.0 || offset == width;
    let span = last_addr - first_addr + 1;

    if uninitialized && (is_slot || span <= EXACT_SPAN_MAX) {
        return IndicatorRange::new(first_addr, last_addr);
    }

    let mut fraction = if uninitialized { 0.5 } else { offset / width };
    if !first_near_anchor {
        fraction = 1.0 - fraction;
    }

    // Widened so addresses near i32::MAX cannot overflow before clamping
    let (low, high) = (i64::from(first_addr), i64::from(last_addr));
    let central = round_half_up(fraction * f64::from(span)) + low - 1;
    let first = (central - WINDOW_BELOW).clamp(low, high);
    let last = (central + WINDOW_ABOVE).clamp(low, high);
    IndicatorRange::new(narrow(first, first_addr), narrow(last, last_addr))
}

/// Compute the positions to light for a whole location
pub fn compute_range_no_offset(
    first_addr: i32,
    last_addr: i32,
    first_near_anchor: bool,
    is_slot: bool,
) -> IndicatorRange {
    compute_range(
        first_addr,
        last_addr,
        first_near_anchor,
        Some(0.0),
        Some(0.0),
        is_slot,
    )
}

fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Back to an address; `value` is already clamped to the span
fn narrow(value: i64, fallback: i32) -> i32 {
    i32::try_from(value).unwrap_or(fallback)
}
