//! Error types and handling
//!
//! This module provides the error types used throughout the picklight engine.
//! All errors implement the `EngineErrorExt` trait which provides operator
//! hints and indicates whether errors are recoverable.
//!
//! # Where errors surface
//!
//! The sequencing, housekeeping, geometry and lighting algorithms never return
//! these errors for malformed data: they log and fall back so that one bad
//! task cannot block a whole cart. `EngineError` is returned only at the
//! edges, where configuration, layouts and task lists are loaded.

use thiserror::Error;

/// Trait for engine error extensions
///
/// Provides an operator-facing hint and recoverability information for each
/// error.
pub trait EngineErrorExt {
    /// Returns a short hint that is safe to show to an operator
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors can be fixed by correcting input and retrying.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Error Categories
///
/// - **Configuration**: invalid or unreadable configuration
/// - **Topology**: malformed facility layouts and dangling references
/// - **Policy lookup**: unknown sequencer or housekeeping policy names
/// - **Geometry**: invalid indicator-range input
/// - **Serialization**: lighting payload or task list encoding
///
/// # Examples
///
/// ```
/// use sdk::errors::{EngineError, EngineErrorExt};
///
/// let error = EngineError::UnknownSequencer("Zigzag".to_string());
/// println!("Hint: {}", error.user_hint());
/// assert!(error.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Topology errors
    #[error("Topology error: {0}")]
    Topology(String),

    #[error("Unknown location: {0}")]
    UnknownLocation(String),

    // Policy lookup errors
    #[error("Unknown sequencer type: {0}")]
    UnknownSequencer(String),

    #[error("Unknown value '{value}' for policy {policy}")]
    UnknownPolicy { policy: String, value: String },

    // Geometry errors
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl EngineErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Check your config.toml file for errors",

            Self::Topology(_) => "The facility layout is malformed. Check the layout file",
            Self::UnknownLocation(_) => "A location referenced by the layout does not exist",

            Self::UnknownSequencer(_) => {
                "Unknown sequencer. Use BayDistance, BayDistanceTopLast or WorkSequence"
            }
            Self::UnknownPolicy { .. } => "Unknown housekeeping policy value",

            Self::InvalidGeometry(_) => "Indicator addresses or offsets are out of range",

            Self::Serialization(_) => "Input or output could not be encoded. Check the file format",

            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // A layout with dangling references has to be fixed at the source
            Self::Topology(_) | Self::UnknownLocation(_) => false,

            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_policy_message_carries_value() {
        let err = EngineError::UnknownPolicy {
            policy: "BAYCHANG".to_string(),
            value: "Sometimes".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("BAYCHANG"));
        assert!(msg.contains("Sometimes"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_topology_errors_are_not_recoverable() {
        assert!(!EngineError::Topology("cycle".into()).is_recoverable());
        assert!(!EngineError::UnknownLocation("F1.A9".into()).is_recoverable());
    }

    #[test]
    fn test_json_error_converts_to_serialization() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: EngineError = json_err.into();
        assert!(matches!(err, EngineError::Serialization(_)));
    }

    #[test]
    fn test_io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: EngineError = io_err.into();
        assert!(matches!(err, EngineError::Io(_)));
        assert_eq!(err.user_hint(), "File system operation failed");
    }

    #[test]
    fn test_all_hints_are_non_empty() {
        let errors = vec![
            EngineError::Config("x".into()),
            EngineError::Topology("x".into()),
            EngineError::UnknownLocation("x".into()),
            EngineError::UnknownSequencer("x".into()),
            EngineError::InvalidGeometry("x".into()),
            EngineError::Serialization("x".into()),
        ];
        for err in errors {
            assert!(!err.user_hint().is_empty(), "{:?} has no hint", err);
        }
    }
}
