//! # Adapters

pub mod schnorr;

pub use schnorr::SchnorrAggregator;
