//! Work sequencing
//!
//! Orders a cart's tasks along the facility's paths. Three strategies are
//! available, selected per facility by name:
//!
//! - **BayDistance**: bays in path order, tiers in working order within a bay
//! - **BayDistanceTopLast**: same bays, but every bay's top tier is deferred
//!   until all other tiers of every bay have been worked
//! - **WorkSequence**: bay-distance order, then re-sorted by the externally
//!   assigned preferred sequence
//!
//! All strategies start from the same stable [`presort::pre_sort`] by
//! position along path, so ties inside one tier keep path order.
//!
//! # Unplaced tasks
//!
//! A task whose location lies in no tier of any path bay cannot be placed
//! geometrically. The bay-distance strategies keep it only when it carries a
//! preferred sequence; otherwise it is returned in [`Sequenced::unplaced`].
//! The work-sequence strategy always keeps it.
//!
//! # Examples
//!
//! ```
//! use picklight_engine::sequencer::SequencerKind;
//!
//! let kind: SequencerKind = "bay_distance_top_last".parse().unwrap();
//! assert_eq!(kind, SequencerKind::BayDistanceTopLast);
//! assert!("Zigzag".parse::<SequencerKind>().is_err());
//! ```

use sdk::errors::EngineError;
use sdk::types::Task;
use sdk::Topology;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::config::canonical_form;

pub mod bay_distance;
pub mod presort;
pub mod work_sequence;

/// Sequencing strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SequencerKind {
    #[default]
    BayDistance,
    BayDistanceTopLast,
    WorkSequence,
}

/// Strategies selectable by configuration, under their configured names
pub const SEQUENCERS: &[(&str, SequencerKind)] = &[
    ("BayDistance", SequencerKind::BayDistance),
    ("BayDistanceTopLast", SequencerKind::BayDistanceTopLast),
    ("WorkSequence", SequencerKind::WorkSequence),
];

impl SequencerKind {
    pub fn as_str(&self) -> &'static str {
        SEQUENCERS
            .iter()
            .find(|(_, kind)| kind == self)
            .map(|(name, _)| *name)
            .unwrap_or("BayDistance")
    }

    /// Order `tasks` with this strategy
    pub fn sort<T: Topology + ?Sized>(self, topology: &T, tasks: Vec<Task>) -> Sequenced {
        let sequenced = match self {
            Self::BayDistance => bay_distance::sort(topology, tasks),
            Self::BayDistanceTopLast => bay_distance::sort_top_last(topology, tasks),
            Self::WorkSequence => work_sequence::sort(topology, tasks),
        };
        tracing::debug!(
            sequencer = self.as_str(),
            ordered = sequenced.ordered.len(),
            unplaced = sequenced.unplaced.len(),
            "sequenced tasks"
        );
        sequenced
    }
}

impl FromStr for SequencerKind {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = canonical_form(value);
        SEQUENCERS
            .iter()
            .find(|(name, _)| canonical_form(name) == wanted)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| EngineError::UnknownSequencer(value.to_string()))
    }
}

impl fmt::Display for SequencerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one sequencing run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequenced {
    /// Tasks in work order
    pub ordered: Vec<Task>,
    /// Tasks that could not be placed and were left out of `ordered`
    pub unplaced: Vec<Task>,
}

/// Compare optional values with `None` after every `Some`
pub(crate) fn nulls_last<V: Ord>(a: Option<&V>, b: Option<&V>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
