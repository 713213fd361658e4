//! Picklight SDK
//!
//! Shared types, collaborator traits and errors for the picklight engine.
//! Collaborators (task generation, topology storage, device protocol) depend
//! on this crate only.

/// Error types and handling
pub mod errors;

/// Work-instruction and lighting types
pub mod types;

/// Read-only facility topology trait
pub mod topology;

// Re-export commonly used types
pub use errors::{EngineError, EngineErrorExt};
pub use topology::{IndicatorSpan, Topology};
pub use types::{
    Color, ControllerRef, InventoryRef, LedCmdGroup, LedSample, LocationId, LocationLevel, Task,
    TaskKind, TaskStatus, EMPTY_LED_STREAM,
};
