//! # Client Dispatch Subsystem (cs-05)
//!
//! Last hop of a round: hands each batched request its [`StampResponse`]
//! and sorts failures into expected, non-fatal classes.
//!
//! | Transport result | Delivery result | Side effect |
//! |------------------|-----------------|-------------|
//! | `Ok` | `Delivered` | - |
//! | `Closed` | `ClientClosed` | client channel released |
//! | `NotEstablished` | `ClientNotEstablished` | - |
//! | `Other` | `OtherTransportError` | logged |
//!
//! [`StampResponse`]: cs_04_round_protocol::StampResponse

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::ChannelClientTransport;
pub use domain::{DispatchCounts, DispatchStats, TransportError};
pub use ports::ClientTransport;
pub use service::ClientDispatcher;
