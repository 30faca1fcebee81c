//! # Stamp Responses
//!
//! What a client receives for one request, and how it checks it on its own:
//!
//! 1. `leaf = SHA3-256(0x00 || payload)`
//! 2. fold `leaf` through `proof` and compare with `global_root`
//! 3. check the signature names the expected signer set (the tree's
//!    aggregate public key)
//! 4. verify `signature` over `global_root || timestamp_le`

use cs_02_merkle_batching::MerkleProof;
use cs_03_signature_aggregation::{AggregationError, CollectiveSignature};
use serde::{Deserialize, Serialize};
use shared_crypto::{merkle_leaf_hash, PointBytes};
use shared_types::{Hash, SequenceNumber, Timestamp, TIMESTAMP_WIRE_LEN};
use thiserror::Error;

/// Bytes covered by the collective signature of a round.
pub fn signed_message(global_root: &Hash, timestamp: Timestamp) -> Vec<u8> {
    let mut message = Vec::with_capacity(global_root.len() + TIMESTAMP_WIRE_LEN);
    message.extend_from_slice(global_root);
    message.extend_from_slice(&timestamp.encode_le());
    message
}

/// Per-request response, dispatched after the broadcast phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StampResponse {
    pub seq_no: SequenceNumber,
    pub timestamp: Timestamp,
    pub global_root: Hash,
    /// Leaf → local root → global root.
    pub proof: MerkleProof,
    pub signature: CollectiveSignature,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StampVerificationError {
    #[error("inclusion proof does not reach the signed root")]
    ProofMismatch,

    /// Signed by a key set other than the tree's.
    #[error("signature not produced by the expected signer set")]
    SignerMismatch,

    #[error("collective signature invalid: {0}")]
    Signature(#[from] AggregationError),
}

impl StampResponse {
    /// Leaf digest the proof should start from.
    pub fn leaf_for(payload: &[u8]) -> Hash {
        merkle_leaf_hash(payload)
    }

    pub fn signed_message(&self) -> Vec<u8> {
        signed_message(&self.global_root, self.timestamp)
    }

    /// Check that `payload` is included under a root signed by `tree_key`,
    /// the aggregate public key of every node in the tree.
    pub fn verify(&self, payload: &[u8], tree_key: &PointBytes) -> Result<(), StampVerificationError> {
        if !self.proof.verifies(&self.global_root, &Self::leaf_for(payload)) {
            return Err(StampVerificationError::ProofMismatch);
        }
        if self.signature.aggregate_public_key != *tree_key {
            return Err(StampVerificationError::SignerMismatch);
        }
        self.signature.verify(&self.signed_message())?;
        Ok(())
    }
}
