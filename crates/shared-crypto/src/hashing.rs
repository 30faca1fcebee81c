//! # SHA3-256 Merkle Hashing
//!
//! Leaf and inner-node hashes are domain separated by a one-byte prefix:
//!
//! ```text
//! leaf  = SHA3-256(0x00 || payload)
//! inner = SHA3-256(0x01 || left || right)
//! ```

use sha3::{Digest, Sha3_256};

/// Prefix for leaf digests.
pub const LEAF_DOMAIN: u8 = 0x00;

/// Prefix for inner-node digests.
pub const NODE_DOMAIN: u8 = 0x01;

/// Plain SHA3-256.
pub fn sha3_256(data: &[u8]) -> [u8; 32] {
    Sha3_256::digest(data).into()
}

/// Digest of a client payload as it enters a Merkle tree.
pub fn merkle_leaf_hash(payload: &[u8]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update([LEAF_DOMAIN]);
    hasher.update(payload);
    hasher.finalize().into()
}

/// Parent digest of two children.
pub fn merkle_node_hash(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update([NODE_DOMAIN]);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}
