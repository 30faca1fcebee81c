//! # Domain Layer

pub mod errors;
pub mod stats;

pub use errors::*;
pub use stats::*;
