//! # Domain Layer
//!
//! Opaque aggregation values. Callers move them between phases and across
//! the wire; only the aggregator looks inside.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
