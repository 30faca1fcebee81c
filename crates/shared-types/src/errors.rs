//! # Error Types
//!
//! Errors shared across subsystems.

use thiserror::Error;

/// Failure to decode a value received from another node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Announcement timestamp payload has the wrong width.
    #[error("Malformed timestamp: expected {expected} bytes, got {actual}")]
    TimestampLength { expected: usize, actual: usize },

    /// A protocol frame could not be deserialised.
    #[error("Malformed frame: {0}")]
    Frame(String),
}
