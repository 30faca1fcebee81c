//! # Value Objects

use shared_types::Hash;

/// Root of a tree with no leaves, and the padding digest for empty slots.
pub const SENTINEL_HASH: Hash = [0u8; 32];
