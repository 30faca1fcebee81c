//! # Domain Layer
//!
//! Pure buffer logic. No I/O.

pub mod queue;

pub use queue::*;
