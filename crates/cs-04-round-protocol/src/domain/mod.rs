//! # Domain Layer
//!
//! Wire messages, per-round state, configuration, errors and the client-side
//! stamp format. No I/O.

pub mod config;
pub mod errors;
pub mod messages;
pub mod round;
pub mod stamp;

pub use config::*;
pub use errors::*;
pub use messages::*;
pub use round::*;
pub use stamp::*;
