//! Housekeeping insertion
//!
//! Between two adjacent tasks the operator may not notice that the work moved
//! on: the cart rolled into another bay, or the same cart position comes up
//! twice in a row. For those boundaries a synthetic housekeeping task is
//! spliced in immediately before the second task, forcing an acknowledgment.
//!
//! # Decision order
//!
//! For each boundary (previous task, next task), first match wins:
//!
//! 1. Bay change, according to [`BayChangePolicy`]
//! 2. Repeated position, according to [`RepeatPosPolicy`], only when no bay
//!    change fired
//!
//! A boundary therefore produces at most one housekeeping task. Missing data
//! (no location, no bay, no container) means "no housekeeping here" and never
//! stops the remaining boundaries from being decided.

use sdk::errors::EngineError;
use sdk::types::{LocationId, LocationLevel, Task, TaskKind, TaskStatus, EMPTY_LED_STREAM};
use sdk::Topology;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter;
use std::str::FromStr;

use crate::config::canonical_form;

/// When to insert a bay-change acknowledgment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BayChangePolicy {
    #[default]
    None,
    /// Any change of bay
    BayChange,
    /// Any change of path segment
    PathSegmentChange,
    /// Any change of bay, except between same-named bays on one path segment
    /// (opposite sides of one aisle, same distance along the path)
    BayChangeExceptAcrossAisle,
}

impl BayChangePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::BayChange => "BayChange",
            Self::PathSegmentChange => "PathSegmentChange",
            Self::BayChangeExceptAcrossAisle => "BayChangeExceptAcrossAisle",
        }
    }
}

impl FromStr for BayChangePolicy {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match canonical_form(value).as_str() {
            "none" => Ok(Self::None),
            "baychange" => Ok(Self::BayChange),
            "pathsegmentchange" => Ok(Self::PathSegmentChange),
            "baychangeexceptacrossaisle" => Ok(Self::BayChangeExceptAcrossAisle),
            _ => Err(EngineError::UnknownPolicy {
                policy: "BAYCHANG".to_string(),
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for BayChangePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When to insert a repeated-position acknowledgment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RepeatPosPolicy {
    #[default]
    None,
    /// Same container twice in a row
    ContainerOnly,
    /// Same container and same planned quantity twice in a row
    ContainerAndCount,
}

impl RepeatPosPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::ContainerOnly => "ContainerOnly",
            Self::ContainerAndCount => "ContainerAndCount",
        }
    }
}

impl FromStr for RepeatPosPolicy {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match canonical_form(value).as_str() {
            "none" => Ok(Self::None),
            "containeronly" => Ok(Self::ContainerOnly),
            "containerandcount" => Ok(Self::ContainerAndCount),
            _ => Err(EngineError::UnknownPolicy {
                policy: "RPEATPOS".to_string(),
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for RepeatPosPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Both housekeeping settings of one facility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HousekeepingPolicy {
    pub bay_change: BayChangePolicy,
    pub repeat_pos: RepeatPosPolicy,
}

impl HousekeepingPolicy {
    pub fn new(bay_change: BayChangePolicy, repeat_pos: RepeatPosPolicy) -> Self {
        Self {
            bay_change,
            repeat_pos,
        }
    }
}

/// Kind of synthetic task a boundary needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HousekeepingKind {
    BayChange,
    RepeatPosition,
}

impl HousekeepingKind {
    pub fn task_kind(self) -> TaskKind {
        match self {
            Self::BayChange => TaskKind::HkBayComplete,
            Self::RepeatPosition => TaskKind::HkRepeatPos,
        }
    }

    /// Description shown on the cart display
    pub fn description(self) -> &'static str {
        match self {
            Self::BayChange => "Bay Change",
            Self::RepeatPosition => "Repeat Container",
        }
    }

    fn id_suffix(self) -> &'static str {
        match self {
            Self::BayChange => "hk-bay",
            Self::RepeatPosition => "hk-repeat",
        }
    }
}

/// Decide the housekeeping needed between two adjacent tasks
///
/// Returns `None` when the boundary needs nothing. A bay change wins over a
/// repeated position when both conditions hold.
pub fn decide<T: Topology + ?Sized>(
    topology: &T,
    prev: &Task,
    next: &Task,
    policy: HousekeepingPolicy,
) -> Option<HousekeepingKind> {
    if wants_bay_change(topology, prev, next, policy.bay_change) {
        Some(HousekeepingKind::BayChange)
    } else if wants_repeat_position(prev, next, policy.repeat_pos) {
        Some(HousekeepingKind::RepeatPosition)
    } else {
        None
    }
}

/// Decide every boundary of an ordered list
///
/// The result has one entry per task: the housekeeping to insert before it.
/// The first task has no predecessor, so its entry is always `None`.
pub fn plan_boundaries<T: Topology + ?Sized>(
    topology: &T,
    tasks: &[Task],
    policy: HousekeepingPolicy,
) -> Vec<Option<HousekeepingKind>> {
    if tasks.is_empty() {
        return Vec::new();
    }

    iter::once(None)
        .chain(
            tasks
                .windows(2)
                .map(|pair| decide(topology, &pair[0], &pair[1], policy)),
        )
        .collect()
}

/// Splice housekeeping tasks into an ordered list
///
/// Each synthetic task lands immediately before the task that triggered it.
pub fn inject<T: Topology + ?Sized>(
    topology: &T,
    tasks: Vec<Task>,
    policy: HousekeepingPolicy,
) -> Vec<Task> {
    let decisions = plan_boundaries(topology, &tasks, policy);

    let synthetic: Vec<Option<Task>> = decisions
        .iter()
        .enumerate()
        .map(|(index, decision)| {
            let kind = (*decision)?;
            let prev = &tasks[index - 1];
            let next = &tasks[index];
            let task = housekeeping_task(kind, topology.facility(), prev, next);
            if let Some(task) = &task {
                tracing::info!(
                    task_id = %task.id,
                    before = %next.id,
                    "adding housekeeping task {}",
                    task.description
                );
            }
            task
        })
        .collect();

    tasks
        .into_iter()
        .zip(synthetic)
        .flat_map(|(task, housekeeping)| housekeeping.into_iter().chain(iter::once(task)))
        .collect()
}

/// Materialize a housekeeping task from its surrounding tasks
///
/// The task inherits the predecessor's cart, assignment time, container and
/// position along path, so it stays in place if the cart filters or re-sorts
/// by position. Returns `None` when the predecessor has no cart.
pub fn housekeeping_task(
    kind: HousekeepingKind,
    facility: &LocationId,
    prev: &Task,
    next: &Task,
) -> Option<Task> {
    let Some(cart) = prev.assigned_cart.clone() else {
        tracing::error!(task_id = %prev.id, "no assigned cart on task preceding housekeeping");
        return None;
    };

    let mut task = Task::new(format!("{}-{}", next.id, kind.id_suffix()), kind.task_kind());
    task.status = TaskStatus::New;
    task.location_id = Some(facility.clone());
    task.container_id = prev.container_id.clone();
    task.plan_quantity = Some(0);
    task.plan_min_quantity = Some(0);
    task.plan_max_quantity = Some(0);
    task.actual_quantity = 0;
    task.position_along_path = prev.position_along_path;
    task.pick_label = Some(String::new());
    task.description = kind.description().to_string();
    task.assigned_cart = Some(cart);
    task.assigned_at = prev.assigned_at;
    task.led_cmd_stream = EMPTY_LED_STREAM.to_string();
    Some(task)
}

fn wants_bay_change<T: Topology + ?Sized>(
    topology: &T,
    prev: &Task,
    next: &Task,
    policy: BayChangePolicy,
) -> bool {
    if policy == BayChangePolicy::None {
        return false;
    }

    let (Some(loc1), Some(loc2)) = (&prev.location_id, &next.location_id) else {
        tracing::error!(
            prev = %prev.id,
            next = %next.id,
            "task without location at housekeeping boundary"
        );
        return false;
    };

    match policy {
        BayChangePolicy::None => false,
        BayChangePolicy::BayChange => is_different_bay(topology, loc1, loc2),
        BayChangePolicy::PathSegmentChange => is_different_segment(topology, loc1, loc2),
        BayChangePolicy::BayChangeExceptAcrossAisle => {
            if !is_different_bay(topology, loc1, loc2) {
                return false;
            }
            if is_different_segment(topology, loc1, loc2) {
                return true;
            }
            // Same-named bays on one segment stand at the same distance along
            // the path, facing each other across the aisle.
            let bay1 = topology.ancestor_at_level(loc1, LocationLevel::Bay);
            let bay2 = topology.ancestor_at_level(loc2, LocationLevel::Bay);
            let label1 = bay1.and_then(|bay| topology.label(&bay));
            let label2 = bay2.and_then(|bay| topology.label(&bay));
            !matches!((label1, label2), (Some(a), Some(b)) if a == b)
        }
    }
}

fn wants_repeat_position(prev: &Task, next: &Task, policy: RepeatPosPolicy) -> bool {
    if policy == RepeatPosPolicy::None {
        return false;
    }

    let (Some(cntr1), Some(cntr2)) = (&prev.container_id, &next.container_id) else {
        tracing::debug!(prev = %prev.id, next = %next.id, "no container to compare");
        return false;
    };
    if cntr1 != cntr2 {
        return false;
    }

    match policy {
        RepeatPosPolicy::None => false,
        RepeatPosPolicy::ContainerOnly => true,
        RepeatPosPolicy::ContainerAndCount => {
            matches!((prev.plan_quantity, next.plan_quantity), (Some(a), Some(b)) if a == b)
        }
    }
}

fn is_different_bay<T: Topology + ?Sized>(topology: &T, loc1: &LocationId, loc2: &LocationId) -> bool {
    let bay1 = topology.ancestor_at_level(loc1, LocationLevel::Bay);
    let bay2 = topology.ancestor_at_level(loc2, LocationLevel::Bay);
    matches!((bay1, bay2), (Some(a), Some(b)) if a != b)
}

fn is_different_segment<T: Topology + ?Sized>(
    topology: &T,
    loc1: &LocationId,
    loc2: &LocationId,
) -> bool {
    let seg1 = topology.path_segment(loc1);
    let seg2 = topology.path_segment(loc2);
    matches!((seg1, seg2), (Some(a), Some(b)) if a != b)
}
