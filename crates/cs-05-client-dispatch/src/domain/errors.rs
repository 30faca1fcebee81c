//! # Transport Errors

use thiserror::Error;

/// Failure reported by a client transport for one send.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The client connection is gone.
    #[error("client connection closed")]
    Closed,

    /// The client connection is not ready yet.
    #[error("client connection not established")]
    NotEstablished,

    #[error("transport error: {0}")]
    Other(String),
}
