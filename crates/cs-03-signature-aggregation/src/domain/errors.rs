//! # Aggregation Errors

use shared_crypto::CryptoError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    /// A commitment or public key is not a valid group element.
    #[error("invalid group element in partial commitment")]
    InvalidPoint,

    /// A challenge or response is not a canonical scalar.
    #[error("non-canonical scalar in challenge or response")]
    InvalidScalar,

    /// The collective signature does not verify.
    #[error("collective signature rejected: {0}")]
    Rejected(CryptoError),
}

impl From<CryptoError> for AggregationError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::InvalidPoint => Self::InvalidPoint,
            CryptoError::InvalidScalar => Self::InvalidScalar,
            other => Self::Rejected(other),
        }
    }
}
