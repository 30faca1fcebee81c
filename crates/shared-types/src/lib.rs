//! # Shared Types Crate
//!
//! Identifiers, client requests and the wire timestamp shared by every
//! collective-signing subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: cross-crate types live here and nowhere else.
//! - **Opaque Requests**: a [`Request`] payload is never interpreted by the
//!   protocol; only its digest enters the round's Merkle tree.
//! - **Fixed-Width Timestamps**: the root's clock reading travels down the tree
//!   as 8 little-endian bytes (see [`Timestamp::encode_le`]).

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
