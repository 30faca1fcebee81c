//! # Domain Errors

use thiserror::Error;

/// Errors raised while building or checking Merkle proofs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MerkleError {
    /// Proof requested for a leaf the tree does not contain.
    #[error("leaf index {index} out of range (leaf count {leaf_count})")]
    IndexOutOfRange { index: usize, leaf_count: usize },

    /// A proof produced by this tree failed to recompute its root.
    #[error("proof for leaf {index} does not reach root {root}")]
    ProofMismatch { index: usize, root: String },
}
