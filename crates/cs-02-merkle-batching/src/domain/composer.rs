//! # Proof Composition
//!
//! A leaf's end-to-end proof is its local path (leaf → local root) followed by
//! the path inherited from the parent (local root → global root):
//!
//! ```text
//!   leaf ──local──→ local root ──inherited──→ global root
//!   full = local ++ inherited
//! ```
//!
//! Reversing the concatenation yields a proof whose halves are each valid yet
//! which never reaches the global root.

use shared_types::Hash;

use super::entities::{MerkleProof, MerkleTree};

/// Full proof for one leaf: `local` then `inherited`.
pub fn compose(inherited: &MerkleProof, local: &MerkleProof) -> MerkleProof {
    local.concat(inherited)
}

/// Combination of a node's local root with the subtree roots of its children.
///
/// The combined root is the Merkle root over `[own, children...]`, children in
/// topology order. Without children the own root passes through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootCombination {
    /// Root reported upward (or signed, at the tree root).
    pub root: Hash,
    /// Path from the node's own local root to `root`.
    pub own_path: MerkleProof,
    /// Path from each child's subtree root to `root`, in topology order.
    pub child_paths: Vec<MerkleProof>,
}

impl RootCombination {
    pub fn new(own: Hash, children: &[Hash]) -> Self {
        if children.is_empty() {
            return Self {
                root: own,
                own_path: MerkleProof::empty(),
                child_paths: Vec::new(),
            };
        }

        let mut entries = Vec::with_capacity(children.len() + 1);
        entries.push(own);
        entries.extend_from_slice(children);
        let tree = MerkleTree::build(entries);

        let mut paths = tree.proofs().into_iter();
        let own_path = paths.next().unwrap_or_default();
        Self {
            root: tree.root(),
            own_path,
            child_paths: paths.collect(),
        }
    }

    /// Inherited path handed to child `index`, given the path this node
    /// inherited from its own parent.
    pub fn path_for_child(&self, index: usize, inherited: &MerkleProof) -> Option<MerkleProof> {
        self.child_paths
            .get(index)
            .map(|below| compose(inherited, below))
    }

    /// Path from this node's local root to the global root.
    pub fn path_for_self(&self, inherited: &MerkleProof) -> MerkleProof {
        compose(inherited, &self.own_path)
    }
}
