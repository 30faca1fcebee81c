//! # Aggregation Values

use serde::{Deserialize, Serialize};
use shared_crypto::{verify_collective, CommitmentSecret, PointBytes, ScalarBytes};

use super::errors::AggregationError;

/// Partial (or aggregate) commitment of a subtree.
///
/// Carries the summed nonce commitment together with the summed public keys
/// of every signer that contributed to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    pub point: PointBytes,
    pub public_key: PointBytes,
}

/// Round challenge, fixed by the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge(pub ScalarBytes);

/// Partial (or aggregate) response of a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response(pub ScalarBytes);

/// Per-round secret behind a node's own commitment.
///
/// Not `Clone`: it is consumed exactly once by `respond`.
#[derive(Debug)]
pub struct NonceSecret(pub(crate) CommitmentSecret);

/// Final signature distributed in the broadcast phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectiveSignature {
    pub challenge: Challenge,
    pub response: Response,
    pub aggregate_commitment: PointBytes,
    pub aggregate_public_key: PointBytes,
}

impl CollectiveSignature {
    /// Check the signature over `message` without access to any signer.
    pub fn verify(&self, message: &[u8]) -> Result<(), AggregationError> {
        verify_collective(
            &self.challenge.0,
            &self.response.0,
            &self.aggregate_commitment,
            &self.aggregate_public_key,
            message,
        )
        .map_err(AggregationError::from)
    }
}
