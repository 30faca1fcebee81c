//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Bytes do not decode to a valid Ristretto point
    #[error("Invalid group element encoding")]
    InvalidPoint,

    /// Bytes are not a canonical scalar encoding
    #[error("Invalid scalar encoding")]
    InvalidScalar,

    /// Challenge does not match the commitment, key and message
    #[error("Challenge mismatch")]
    ChallengeMismatch,

    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,
}
