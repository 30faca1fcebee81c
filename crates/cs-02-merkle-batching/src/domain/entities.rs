//! # Domain Entities
//!
//! `MerkleTree`, `MerkleProof`, `ProofNode`, `SiblingPosition`.

use serde::{Deserialize, Serialize};
use shared_crypto::merkle_node_hash;
use shared_types::Hash;

use super::errors::MerkleError;
use super::value_objects::SENTINEL_HASH;

/// A binary Merkle tree over leaf digests, kept in array form.
///
/// ## Shape
///
/// - 0 leaves: root is [`SENTINEL_HASH`], no nodes to prove.
/// - 1 leaf: the leaf is the root; its proof is empty.
/// - n ≥ 2 leaves: padded with [`SENTINEL_HASH`] to the next power of two.
///
/// Leaves keep their input order; duplicates are kept as separate leaves.
/// Parent at index `i` has children at `2i + 1` and `2i + 2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    /// `[root, level1..., leaves...]`
    nodes: Vec<Hash>,
    leaf_count: usize,
    padded_leaf_count: usize,
}

impl MerkleTree {
    /// Build a tree over already-hashed leaves.
    pub fn build(leaves: Vec<Hash>) -> Self {
        let leaf_count = leaves.len();
        if leaf_count == 0 {
            return Self {
                nodes: vec![SENTINEL_HASH],
                leaf_count: 0,
                padded_leaf_count: 0,
            };
        }

        let padded_leaf_count = leaf_count.next_power_of_two();
        let leaf_start = padded_leaf_count - 1;
        let mut nodes = vec![SENTINEL_HASH; leaf_start + padded_leaf_count];
        nodes[leaf_start..leaf_start + leaf_count].copy_from_slice(&leaves);

        for i in (0..leaf_start).rev() {
            nodes[i] = merkle_node_hash(&nodes[2 * i + 1], &nodes[2 * i + 2]);
        }

        Self {
            nodes,
            leaf_count,
            padded_leaf_count,
        }
    }

    pub fn root(&self) -> Hash {
        self.nodes[0]
    }

    /// Number of real leaves (before padding).
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    pub fn is_empty(&self) -> bool {
        self.leaf_count == 0
    }

    /// Leaf digest at `index`.
    pub fn leaf(&self, index: usize) -> Option<Hash> {
        if index >= self.leaf_count {
            return None;
        }
        self.nodes.get(self.padded_leaf_count - 1 + index).copied()
    }

    /// Sibling path from leaf `index` up to the root.
    pub fn proof(&self, index: usize) -> Result<MerkleProof, MerkleError> {
        if index >= self.leaf_count {
            return Err(MerkleError::IndexOutOfRange {
                index,
                leaf_count: self.leaf_count,
            });
        }

        let mut current = self.padded_leaf_count - 1 + index;
        let mut path = Vec::new();

        while current > 0 {
            // Odd indices are left children.
            let (sibling, position) = if current % 2 == 1 {
                (current + 1, SiblingPosition::Right)
            } else {
                (current - 1, SiblingPosition::Left)
            };
            path.push(ProofNode {
                hash: self.nodes[sibling],
                position,
            });
            current = (current - 1) / 2;
        }

        Ok(MerkleProof { path })
    }

    /// Proofs for every real leaf, in leaf order.
    pub fn proofs(&self) -> Vec<MerkleProof> {
        (0..self.leaf_count)
            .filter_map(|i| self.proof(i).ok())
            .collect()
    }
}

/// Ordered sibling path from a leaf digest to some root.
///
/// The first node is the leaf's immediate sibling. Two proofs chain by
/// [`MerkleProof::concat`]: the lower fragment first, the upper one after.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    path: Vec<ProofNode>,
}

impl MerkleProof {
    pub fn new(path: Vec<ProofNode>) -> Self {
        Self { path }
    }

    /// Proof of a root against itself.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[ProofNode] {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// `self` followed by `upper`.
    pub fn concat(&self, upper: &MerkleProof) -> MerkleProof {
        let mut path = Vec::with_capacity(self.path.len() + upper.path.len());
        path.extend_from_slice(&self.path);
        path.extend_from_slice(&upper.path);
        MerkleProof { path }
    }

    /// Fold `leaf` through the path and return the resulting root.
    pub fn compute_root(&self, leaf: &Hash) -> Hash {
        self.path.iter().fold(*leaf, |acc, node| match node.position {
            SiblingPosition::Left => merkle_node_hash(&node.hash, &acc),
            SiblingPosition::Right => merkle_node_hash(&acc, &node.hash),
        })
    }

    pub fn verifies(&self, root: &Hash, leaf: &Hash) -> bool {
        self.compute_root(leaf) == *root
    }
}

/// One step of a proof: the sibling digest and which side it sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofNode {
    pub hash: Hash,
    pub position: SiblingPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiblingPosition {
    Left,
    Right,
}

/// Recompute `root` from `leaf` along `proof`.
pub fn check_proof(root: &Hash, leaf: &Hash, proof: &MerkleProof) -> bool {
    proof.verifies(root, leaf)
}
