//! # Shared Crypto - Stamping Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA3-256, domain separated | Merkle leaves and inner nodes |
//! | `schnorr` | Schnorr over Ristretto255 | Collective (multi-party) signatures |
//!
//! ## Security Properties
//!
//! - **Domain separation**: leaf and inner-node hashes use distinct prefixes, so
//!   an inner node can never be presented as a leaf.
//! - **Additive partials**: commitments, public keys and responses combine by
//!   plain group/scalar addition, which lets any tree shape aggregate them.
//! - **Nonce hygiene**: per-round commitment secrets are consumed by value and
//!   zeroized on drop.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod schnorr;

pub use errors::CryptoError;
pub use hashing::{merkle_leaf_hash, merkle_node_hash, sha3_256, LEAF_DOMAIN, NODE_DOMAIN};
pub use schnorr::{
    add_points, add_scalars, challenge_scalar, commit, respond, verify_collective, CommitmentSecret,
    PointBytes, ScalarBytes, SchnorrKeyPair,
};
