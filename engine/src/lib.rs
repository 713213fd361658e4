//! Picklight Engine Library
//!
//! This library provides the core functionality of the picklight engine:
//! sequencing a cart's tasks along the facility path, inserting housekeeping
//! acknowledgments and computing indicator lighting. It is used by both the
//! main binary and integration tests.

/// Configuration management module
pub mod config;

/// Indicator range geometry
pub mod geometry;

/// Housekeeping decision and insertion
pub mod housekeeping;

/// Lighting pattern selection and serialization
pub mod lighting;

/// Sequencing strategies
pub mod sequencer;

/// In-memory facility topology
pub mod topology;

/// Compute-work pipeline and sort codes
pub mod work;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
