//! # Domain Layer
//!
//! Pure Merkle logic. No I/O, no locking: every function here operates on a
//! frozen request snapshot or on proofs received from a parent.

pub mod composer;
pub mod entities;
pub mod errors;
pub mod value_objects;

pub use composer::*;
pub use entities::*;
pub use errors::*;
pub use value_objects::*;
