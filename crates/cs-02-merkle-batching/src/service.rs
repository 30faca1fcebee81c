//! # Merkle Batcher
//!
//! Turns one round's frozen request snapshot into a local root plus one proof
//! per request, and checks proofs for verifiers and the pre-signing gate.

use shared_crypto::merkle_leaf_hash;
use shared_types::{short_hex, Hash, Request};
use tracing::{debug, error};

use crate::domain::{check_proof, MerkleError, MerkleProof, MerkleTree, RootCombination};

/// Local batch of one round on one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalBatch {
    /// Root over this node's own leaves.
    pub root: Hash,
    /// Leaf digests, in request order.
    pub leaves: Vec<Hash>,
    /// `proofs[i]` takes `leaves[i]` to `root`. An empty batch carries a
    /// single empty proof.
    pub proofs: Vec<MerkleProof>,
}

impl LocalBatch {
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }
}

/// Builds per-round Merkle batches.
#[derive(Debug, Default, Clone, Copy)]
pub struct MerkleBatcher;

impl MerkleBatcher {
    pub fn new() -> Self {
        Self
    }

    /// Hash `payloads` as leaves, in order, and build the local tree.
    pub fn build_tree<P: AsRef<[u8]>>(&self, payloads: &[P]) -> LocalBatch {
        let leaves: Vec<Hash> = payloads
            .iter()
            .map(|p| merkle_leaf_hash(p.as_ref()))
            .collect();
        let tree = MerkleTree::build(leaves.clone());

        let proofs = if tree.is_empty() {
            vec![MerkleProof::empty()]
        } else {
            tree.proofs()
        };

        debug!(
            leaves = leaves.len(),
            root = %short_hex(&tree.root()),
            "Built local Merkle tree"
        );

        LocalBatch {
            root: tree.root(),
            leaves,
            proofs,
        }
    }

    /// Batch a round's requests by payload.
    pub fn batch(&self, requests: &[Request]) -> LocalBatch {
        let payloads: Vec<&[u8]> = requests.iter().map(|r| r.payload.as_slice()).collect();
        self.build_tree(&payloads)
    }

    /// Combine an own root with child subtree roots (topology order).
    pub fn combine(&self, own: Hash, children: &[Hash]) -> RootCombination {
        RootCombination::new(own, children)
    }

    pub fn check_proof(&self, root: &Hash, leaf: &Hash, proof: &MerkleProof) -> bool {
        check_proof(root, leaf, proof)
    }

    /// Re-verify every leaf proof of `batch` against its local root.
    pub fn check_local_proofs(&self, batch: &LocalBatch) -> Result<(), MerkleError> {
        for (index, (leaf, proof)) in batch.leaves.iter().zip(&batch.proofs).enumerate() {
            if !check_proof(&batch.root, leaf, proof) {
                error!(index, root = %short_hex(&batch.root), "Local leaf proof does not verify");
                return Err(MerkleError::ProofMismatch {
                    index,
                    root: hex::encode(batch.root),
                });
            }
        }
        Ok(())
    }
}
