//! # Merkle Batching Subsystem (cs-02)
//!
//! Builds one Merkle tree per node per round over the requests frozen by
//! cs-01, and composes per-leaf proofs with the path inherited from the
//! parent so that every client can verify against the single signed root.
//!
//! ## Proof Layout
//!
//! ```text
//!                      global root
//!                     /           \
//!          combine(R.local, A.sub, B.sub, ...)      ← inherited path
//!                 /
//!           A.local root                            ← local path
//!            /      \
//!        leaf_0   leaf_1 ...
//! ```
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement |
//! |----|-----------|-------------|
//! | INVARIANT-1 | Power of two padding | `MerkleTree::build` pads with `SENTINEL_HASH` |
//! | INVARIANT-2 | Every generated proof verifies | `check_local_proofs` gate, tests |
//! | INVARIANT-3 | Input order kept, no dedup | leaves hashed in slice order |
//! | INVARIANT-4 | `full = local ++ inherited` | `compose` |
//! | INVARIANT-5 | Empty batch is a valid round | sentinel root, one empty proof |
//!
//! ## Hashing
//!
//! Leaves are `SHA3-256(0x00 || payload)`, inner nodes
//! `SHA3-256(0x01 || left || right)` (see `shared-crypto`).

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod service;

pub use domain::{
    check_proof, compose, MerkleError, MerkleProof, MerkleTree, ProofNode, RootCombination,
    SiblingPosition, SENTINEL_HASH,
};
pub use service::{LocalBatch, MerkleBatcher};
